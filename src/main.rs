fn main() {
    mass_shot::game::run();
}
