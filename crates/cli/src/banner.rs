use colored::Colorize;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print() {
	println!("{}", format!("=== WMS outbound wave bot v{VERSION} ===").bright_magenta().bold());
}
