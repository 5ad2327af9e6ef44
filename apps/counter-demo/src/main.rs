use counter_demo::combined_app;
use sprig_core::{MemoryDocument, NodeId, RenderError, Renderer, Runtime, RuntimeConfig};

fn click(renderer: &mut Renderer<MemoryDocument>, root: NodeId, id: &str) -> Result<(), RenderError> {
    let targets = renderer.target().find_by_attribute(root, "id", id);
    let Some(&target) = targets.first() else {
        log::warn!("no element with id {id:?}");
        return Ok(());
    };
    renderer
        .target()
        .dispatch_event(target, sprig_core::Event::new("click"));
    let report = renderer.flush()?;
    println!("click #{id}: {report:?}");
    Ok(())
}

fn main() -> Result<(), RenderError> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== sprig counter demo ===");
    println!("Renders into an in-memory document and replays a few clicks:");
    println!("  - class counter with set_state and lifecycle logging");
    println!("  - two function components sharing one store key");
    println!();

    let mut document = MemoryDocument::new();
    let root = document.create_container("div");
    let mut renderer = Renderer::new(Runtime::new(RuntimeConfig::default()), document);

    renderer.render(combined_app(), root)?;
    renderer.flush()?;
    println!("{}", renderer.target().dump_tree(root));

    click(&mut renderer, root, "increment")?;
    click(&mut renderer, root, "increment")?;
    click(&mut renderer, root, "decrement")?;
    click(&mut renderer, root, "shared-increment")?;
    click(&mut renderer, root, "shared-increment")?;

    println!();
    println!("{}", renderer.target().dump_tree(root));
    println!("text: {:?}", renderer.target().text_content(root));
    println!("stats: {:?}", renderer.stats());

    renderer.unmount(root)?;
    renderer.flush()?;
    Ok(())
}
