use shelf::channel::ResponseBuffer;
use shelf::registry::PackageRegistry;
use shelf::{ShelfError, ShelfResult};
use std::io::Write;

pub struct CatOptions {
    pub path: String,
    pub origin: String,
    pub locale: Option<String>,
    pub include: bool,
}

pub fn run(registry: &PackageRegistry, options: CatOptions) -> ShelfResult<()> {
    if !options.origin.starts_with("http") {
        return Err(ShelfError::Config(format!(
            "Origin must be an http(s) URL: {}",
            options.origin
        )));
    }

    let mut channel = ResponseBuffer::new(options.origin);
    if let Some(locale) = &options.locale {
        channel = channel.with_header("Accept-Language", locale);
    }

    registry.serve_file(&options.path, &mut channel)?;

    let status = channel.status.unwrap_or(500);
    let mut stdout = std::io::stdout().lock();
    if options.include {
        writeln!(stdout, "{} {}", status, channel.reason)?;
        for (name, value) in &channel.headers {
            writeln!(stdout, "{}: {}", name, value)?;
        }
        writeln!(stdout)?;
    }
    stdout.write_all(&channel.body)?;
    stdout.flush()?;

    if channel.is_ok() {
        Ok(())
    } else {
        Err(ShelfError::NotFound(format!(
            "{}: {} {}",
            options.path, status, channel.reason
        )))
    }
}
