fn main() {
    if let Err(err) = horizhist::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
