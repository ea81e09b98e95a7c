use shelf::registry::PackageRegistry;
use shelf::ShelfResult;

pub fn run(registry: &PackageRegistry) -> ShelfResult<()> {
    println!("{}", registry.manifests());
    Ok(())
}

pub fn run_bridges(registry: &PackageRegistry) -> ShelfResult<()> {
    let bridges = serde_json::to_string_pretty(&registry.get_bridges())?;
    println!("{}", bridges);
    Ok(())
}
