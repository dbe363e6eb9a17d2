/// Returns the positional command-line argument at `index`, or `default`
fn get_arg(index: usize, default: &str) -> String {
    std::env::args().nth(index).unwrap_or_else(|| default.to_string())
}

/// Parses the trading symbol from the first command-line argument
pub fn get_symbol(default: &str, uppercase: bool) -> String {
    let symbol = get_arg(1, default);
    if uppercase { symbol.to_uppercase() } else { symbol.to_lowercase() }
}

/// Parses the trading symbol from command-line arguments (uppercase version)
pub fn get_symbol_uppercase(default: &str) -> String {
    get_symbol(default, true)
}

/// Parses the config file path from the second command-line argument
pub fn get_config_path(default: &str) -> String {
    get_arg(2, default)
}
