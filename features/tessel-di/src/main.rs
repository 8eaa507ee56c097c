use std::{cell::Cell, rc::Rc};

use tessel_di::{
    Construct, Container, DependencyKey, DiError, Module, ResolvedDependencies, Scope,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), DiError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let greeting = DependencyKey::named("GREETING");
    let counter = DependencyKey::named("REQUEST_COUNTER");
    let request = DependencyKey::symbol("Request");
    let greeter = DependencyKey::symbol("Greeter");

    let config = Module::new();
    config.bind(&greeting).to_value("hello".to_string());
    config.bind(&counter).to_value(Cell::new(0_u32));

    let services = Module::new();
    services
        .bind(&request)
        .in_scope(Scope::Scoped)
        .to_factory(|di| {
            let counter = di.get::<Cell<u32>>(&DependencyKey::named("REQUEST_COUNTER"))?;
            counter.set(counter.get() + 1);
            Ok(Request { id: counter.get() })
        });
    services
        .bind(&greeter)
        .in_scope(Scope::Transient)
        .to_class::<Greeter>([("greeting", greeting.clone()), ("request", request.clone())])?;

    let container = Container::new();
    container.load("config", &config);
    container.load("services", &services);
    println!("{container:?}");

    for name in ["ada", "grace"] {
        container.run_in_scope(|| {
            let first = container.get::<Greeter>(&greeter)?;
            let second = container.get::<Greeter>(&greeter)?;
            println!("{}", first.greet(name));
            println!("same request: {}", Rc::ptr_eq(&first.request, &second.request));
            Ok::<_, DiError>(())
        })?;
    }

    Ok(())
}

#[derive(Debug)]
struct Request {
    id: u32,
}

#[derive(Debug)]
struct Greeter {
    greeting: Rc<String>,
    request: Rc<Request>,
}

impl Greeter {
    fn greet(&self, name: &str) -> String {
        format!("{} {name} (request {})", self.greeting, self.request.id)
    }
}

impl Construct for Greeter {
    fn construct(deps: ResolvedDependencies) -> Result<Self, DiError> {
        Ok(Greeter {
            greeting: deps.named("greeting")?,
            request: deps.named("request")?,
        })
    }
}
