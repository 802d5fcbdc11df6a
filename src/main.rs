fn main() {
    if let Err(err) = moviegraph::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
