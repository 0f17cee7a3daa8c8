fn main() {
    if let Err(error) = privreview_cli::run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}
