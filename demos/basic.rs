use event_manager::{listener_fn, Error, Event, EventData, EventManager, Priority};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> event_manager::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let manager = EventManager::builder()
        .name("demo")
        .configure(|c| c.enable_tracing(true))
        .build();

    manager.listen_with_priority(
        "order.created",
        listener_fn(|e: &mut Event| {
            println!("validating order {}", e.get("id").unwrap_or(&json!(null)));
            e.set("valid", true);
            Ok(())
        }),
        Priority::High,
    )?;

    manager.listen(
        "order.*",
        listener_fn(|e: &mut Event| {
            println!("order group saw {}", e.name());
            Ok(())
        }),
    )?;

    manager.listen_with_priority(
        "*",
        listener_fn(|e: &mut Event| {
            println!("audit: {}", e.to_json()?);
            Ok(())
        }),
        Priority::Min,
    )?;

    manager.listen(
        "order.cancelled",
        listener_fn(|_: &mut Event| Err(Error::handler("cancellation window closed"))),
    )?;

    let data = EventData::from([("id".to_string(), json!(1001))]);
    let event = manager.publish("order.created", data).await?;
    println!("published {} -> valid = {:?}", event.name(), event.get("valid"));

    if let Err(e) = manager.publish("order.cancelled", EventData::new()).await {
        println!("publish failed: {e}");
    }

    let errors = manager
        .publish_batch(["order.shipped", "order.cancelled", "nobody.listens"])
        .await;
    println!("batch finished with {} error(s)", errors.len());

    let handle = manager.publish_async(Event::named("order.archived"));
    handle.await.map_err(|e| Error::internal(e.to_string()))?;

    println!("{}", manager.stats());
    Ok(())
}
