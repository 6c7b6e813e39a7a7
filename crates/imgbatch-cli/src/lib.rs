use imgbatch_editor::SizeTarget;

/// Parse `label=WxH`, `label=Wx`, `label=xH`, optionally suffixed with `:crop`.
pub fn parse_size_target(s: &str) -> Result<(String, SizeTarget), String> {
    let (label, bounds) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid size '{}'. Expected: label=WxH[:crop]", s))?;

    let label = label.trim();
    if label.is_empty() {
        return Err(format!("Missing size label in '{}'", s));
    }

    let (dims, crop) = match bounds.split_once(':') {
        Some((dims, "crop")) => (dims, true),
        Some((_, flag)) => return Err(format!("Unknown size flag: {}", flag)),
        None => (bounds, false),
    };

    let (width, height) = dims
        .split_once('x')
        .ok_or_else(|| "Invalid dimensions format. Expected: WxH, Wx, or xH".to_string())?;

    let width = parse_side(width, "width")?;
    let height = parse_side(height, "height")?;

    if width.is_none() && height.is_none() {
        return Err("At least one dimension must be specified".to_string());
    }

    Ok((label.to_string(), SizeTarget::new(width, height, crop)))
}

fn parse_side(value: &str, name: &str) -> Result<Option<u32>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| format!("Invalid {}: {}", name, value))
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
