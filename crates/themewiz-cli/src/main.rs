fn main() {
    if let Err(error) = themewiz_cli::run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
