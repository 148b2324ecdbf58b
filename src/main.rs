fn main() {
    if let Err(err) = tiltclock_lib::run() {
        eprintln!("tiltclock: {err:#}");
        std::process::exit(1);
    }
}
