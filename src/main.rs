fn main() {
    if let Err(err) = diagram_layout::run() {
        eprintln!("error: {err:#}");
        std::process::exit(diagram_layout::cli::exit_code(&err));
    }
}
