fn main() {
    charities_frontend::start();
}
