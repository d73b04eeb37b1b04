use ufwlog::runtime::boot;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    boot::run()
}
