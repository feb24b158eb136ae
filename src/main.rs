fn main() {
  if let Err(e) = hevy_planner_lib::run() {
    eprintln!("Error: {}", e);
    std::process::exit(1);
  }
}
