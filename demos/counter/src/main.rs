use std::cell::Cell;
use std::rc::Rc;

use tally_core::Runtime;
use tally_counter::{CounterConfig, CounterElement, Registry, define_counter};
use tally_dom::Dom;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rt = Runtime::new();
    let dom = Dom::new();

    // Stand-in for an animation frame request.
    let frame_requested = Rc::new(Cell::new(false));
    rt.set_host_scheduler({
        let frame_requested = frame_requested.clone();
        move || frame_requested.set(true)
    });
    let frame = || {
        if frame_requested.replace(false) {
            rt.flush();
        }
    };

    let mut registry = Registry::new(&rt, &dom);
    define_counter(&mut registry, CounterConfig::default())?;

    let host = registry.create(dom.body(), "ps-counter")?;
    {
        let mut doc = dom.borrow_mut();
        let label = doc.create_text("clicks so far");
        doc.append_child(host, label)?;
    }

    let button = registry
        .get::<CounterElement>(host)
        .and_then(|e| e.counter())
        .map(|c| c.button())
        .ok_or_else(|| anyhow::anyhow!("<ps-counter> did not mount"))?;

    for _ in 0..3 {
        dom.click(button)?;
    }
    frame();
    println!("{}", dom.borrow().outer_html(host));

    registry.set_attribute(host, "type", "outline")?;
    println!("{}", dom.borrow().outer_html(host));

    registry.remove(host)?;
    log::info!("removed counter, {} nodes left", dom.borrow().len());
    Ok(())
}
