use shelf::registry::PackageRegistry;
use shelf::ShelfResult;

pub fn run(registry: &PackageRegistry) -> ShelfResult<()> {
    match registry.checksum() {
        Some(checksum) => println!("{}", checksum),
        None => println!("No checksum: user packages are present and cannot be cached."),
    }
    Ok(())
}
