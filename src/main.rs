fn main() {
    if let Err(err) = cropscan_lib::run() {
        eprintln!("cropscan: {err:#}");
        std::process::exit(1);
    }
}
