use unicorn_bridge_core::BridgeConfig;

fn main() {
    unicorn_bridge_core::init();

    let config = match BridgeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Unicorn Bridge Configuration:\n");
    for chain in &config.chains {
        let tokens: Vec<&str> = chain.tokens.iter().map(|t| t.symbol.as_str()).collect();
        println!("  {} ({})", chain.name, chain.id);
        println!("    RPC URL: {}", chain.rpc_url);
        println!("    Override: {}", chain.rpc_env_key());
        println!("    Tokens: {}", tokens.join(", "));
    }
    println!();
    println!("  Quote API: {}", config.quote_api_url);
    println!("  Client ID: {}", if config.client_id.is_some() { "(set)" } else { "(not set)" });
    println!("  Storage: {}", config.storage_dir);
    println!("  Signer: {}", if config.private_key.is_some() { "local key" } else { "(none)" });
    println!(
        "  Multipliers: cross-chain {} bps, same-chain {} bps",
        config.cross_chain_multiplier_bps, config.same_chain_multiplier_bps
    );

    let problems = config.validate();
    if problems.is_empty() {
        println!("\n  Configuration is valid");
    } else {
        println!("\n  Problems:");
        for problem in problems {
            println!("    - {}", problem);
        }
    }
}
