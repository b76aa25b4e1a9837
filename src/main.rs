fn main() {
    if let Err(err) = crime_lens::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
