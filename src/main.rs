fn main() {
    if let Err(err) = strikevision_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
