use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{ensure_parent_dir, expand_home, get_config_path, Config};
use crate::scoring::{domain_problem, Domains, FieldDomain, Metric, SelectionConfig, WeightConfig};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

fn parse_weight(input: &str) -> Result<f64, String> {
    match input.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err("must be a non-negative number".to_string()),
        Err(_) => Err(format!("'{}' is not a number", input)),
    }
}

fn parse_top_k(input: &str) -> Result<usize, String> {
    match input.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("'{}' is not a whole number", input)),
    }
}

/// "none" (or empty) disables the floor
fn parse_ethical_floor(input: &str) -> Result<Option<f64>, String> {
    if input.is_empty() || input.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match input.parse::<f64>() {
        Ok(v) if (0.0..=100.0).contains(&v) => Ok(Some(v)),
        Ok(_) => Err("must be between 0 and 100".to_string()),
        Err(_) => Err(format!("'{}' is not a number", input)),
    }
}

fn parse_bound(input: &str) -> Result<f64, String> {
    match input.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{}' is not a number", input)),
    }
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

fn prompt_parsed<T>(
    message: &str,
    default: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let input = prompt_with_default(message, default)?;
        match parse(&input) {
            Ok(v) => return Ok(v),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

fn prompt_weights() -> Result<WeightConfig> {
    let defaults = WeightConfig::default();
    typewriter("Each supplier is scored on four metrics. Weights say how much each one counts.");
    typewriter("Cost, CO2 and delivery time are better when lower; the ethical score is better when higher.");
    typewriter("Weights that sum to 1.0 keep scores between 0 and 1.");

    let mut values = [0.0; 4];
    for (slot, metric) in values.iter_mut().zip(Metric::ALL) {
        *slot = prompt_parsed(
            &format!("{} weight", metric.label()),
            &format_number(defaults.get(metric)),
            parse_weight,
        )?;
    }
    let weights = WeightConfig {
        cost: values[0],
        co2: values[1],
        delivery_time: values[2],
        ethical_score: values[3],
    };

    if (weights.sum() - 1.0).abs() > 1e-9 {
        println!("  Weights sum to {:.3}.", weights.sum());
        if let Some(normalized) = weights.normalized() {
            if prompt_yes_no("  Rescale them to sum to 1.0?", true)? {
                return Ok(normalized);
            }
        }
    }
    Ok(weights)
}

fn prompt_domains() -> Result<Domains> {
    let mut domains = Domains::default();
    typewriter("Records outside these ranges are rejected before scoring.");
    for metric in Metric::ALL {
        let current = domains.get(metric);
        loop {
            let min = prompt_parsed(
                &format!("  {} minimum", metric.label()),
                &format_number(current.min),
                parse_bound,
            )?;
            let max = prompt_parsed(
                &format!("  {} maximum", metric.label()),
                &format_number(current.max),
                parse_bound,
            )?;
            let chosen = FieldDomain::new(min, max);
            if let Some(problem) = domain_problem(metric, chosen) {
                println!("  Invalid: {}. Try again.", problem);
                continue;
            }
            let domain = match metric {
                Metric::Cost => &mut domains.cost,
                Metric::Co2 => &mut domains.co2,
                Metric::DeliveryTime => &mut domains.delivery_time,
                Metric::EthicalScore => &mut domains.ethical_score,
            };
            *domain = chosen;
            break;
        }
    }
    Ok(domains)
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Supplier Rank Configuration Wizard");
    println!("==================================");
    println!();

    // 1. Weights
    let weights = if prompt_yes_no("Configure metric weights? (n accepts defaults)", true)? {
        println!();
        prompt_weights()?
    } else {
        WeightConfig::default()
    };

    // 2. Field domains
    println!();
    let domains = if prompt_yes_no(
        "Field ranges - use defaults? (cost 100-5000, CO2 50-200, delivery 1-60 days, ethical 0-100)",
        true,
    )? {
        None
    } else {
        Some(prompt_domains()?)
    };

    // 3. Selection
    println!();
    typewriter("The top suppliers of each ranking are selected and summarized.");
    let selection_defaults = SelectionConfig::default();
    let top_k = prompt_parsed(
        "How many suppliers to select",
        &selection_defaults.top_k.to_string(),
        parse_top_k,
    )?;
    typewriter("An ethical floor drops suppliers below that score from the selection. Use 'none' for no floor.");
    let min_ethical_score =
        prompt_parsed("Minimum ethical score", "none", parse_ethical_floor)?;

    // 4. Excluded suppliers
    println!();
    typewriter("Exclude patterns leave matching supplier names out of every ranking (e.g., 'Test*').");
    let mut exclude: Vec<String> = Vec::new();
    let mut add_pattern = prompt_yes_no("Add an exclude pattern?", false)?;
    while add_pattern {
        let pattern = prompt("  Name pattern: ")?;
        match glob::Pattern::new(&pattern) {
            Ok(_) if !pattern.is_empty() => exclude.push(pattern),
            Ok(_) => println!("  Pattern is required."),
            Err(e) => println!("  Invalid pattern: {}. Try again.", e),
        }
        add_pattern = prompt_yes_no("  Add another exclude pattern?", false)?;
    }

    // 5. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = expand_home(&PathBuf::from(&path_str));

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 6. Write config
    let config = Config {
        weights: Some(weights),
        domains,
        selection: Some(SelectionConfig {
            top_k,
            min_ethical_score,
        }),
        exclude: if exclude.is_empty() { None } else { Some(exclude) },
        ..Config::default()
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    ensure_parent_dir(&config_path)?;
    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    typewriter("Add suppliers with `supplier-rank add`, or generate a test set with `supplier-rank sample`.");
    println!("Run `supplier-rank` to rank them.");

    Ok(())
}
