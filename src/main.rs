fn main() {
    env_logger::init();
    kestrel::board::init();
    kestrel::uci::run();
}
