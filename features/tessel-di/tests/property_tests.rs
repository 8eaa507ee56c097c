//! Property based tests for resolution and caching
use std::{cell::Cell, rc::Rc};

use proptest::prelude::*;
use tessel_di::*;

fn chain_key(index: usize) -> DependencyKey {
    DependencyKey::named(format!("LINK_{index}"))
}

/// Binds LINK_0 -> LINK_1 -> ... -> LINK_{len - 1}, the last link depends on `tail`
fn bind_chain(container: &Container, len: usize, tail: Option<DependencyKey>) {
    for index in 0..len {
        let next = if index + 1 < len {
            Some(chain_key(index + 1))
        } else {
            tail.clone()
        };
        let binder = container.bind(chain_key(index));
        match next {
            Some(next) => binder
                .to_higher_order_function(|deps| Ok(*deps.get::<usize>(0)? + 1), [next])
                .unwrap(),
            None => binder.to_value(0_usize),
        }
    }
}

proptest! {
    #[test]
    fn bound_values_resolve_unchanged(value in any::<i64>(), text in ".*") {
        let container = Container::new();
        container.bind("NUMBER").to_value(value);
        container.bind("TEXT").to_value(text.clone());

        prop_assert_eq!(*container.get::<i64>(&"NUMBER".into()).unwrap(), value);
        let resolved = container.get::<String>(&"TEXT".into()).unwrap();
        prop_assert_eq!(resolved.as_str(), text.as_str());
    }

    #[test]
    fn factories_run_according_to_scope(resolutions in 1_usize..20) {
        let container = Container::new();
        let singleton_calls = Rc::new(Cell::new(0_usize));
        let transient_calls = Rc::new(Cell::new(0_usize));

        let counter = singleton_calls.clone();
        container.bind("SINGLETON").to_factory(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        let counter = transient_calls.clone();
        container
            .bind("TRANSIENT")
            .in_scope(Scope::Transient)
            .to_factory(move |_| {
                counter.set(counter.get() + 1);
                Ok(())
            });

        for _ in 0..resolutions {
            container.get::<()>(&"SINGLETON".into()).unwrap();
            container.get::<()>(&"TRANSIENT".into()).unwrap();
        }

        prop_assert_eq!(singleton_calls.get(), 1);
        prop_assert_eq!(transient_calls.get(), resolutions);
    }

    #[test]
    fn dependency_chains_resolve(len in 1_usize..40) {
        let container = Container::new();
        bind_chain(&container, len, None);

        prop_assert_eq!(*container.get::<usize>(&chain_key(0)).unwrap(), len - 1);
    }

    #[test]
    fn cycles_report_the_full_path(len in 1_usize..20) {
        let container = Container::new();
        bind_chain(&container, len, Some(chain_key(0)));

        let first = chain_key(0);
        let error = container.get::<usize>(&first).unwrap_err();

        match error {
            DiError::CircularDependency { path } => {
                prop_assert_eq!(path.0.len(), len + 1);
                prop_assert_eq!(path.0.first(), Some(&first));
                prop_assert_eq!(path.0.last(), Some(&first));
            }
            other => prop_assert!(false, "unexpected error: {other}"),
        }
        // The failed resolution leaves nothing behind
        let still_circular = matches!(
            container.get::<usize>(&first),
            Err(DiError::CircularDependency { .. })
        );
        prop_assert!(still_circular);
    }

    #[test]
    fn named_keys_compare_by_name(name in "[A-Z_]{1,12}") {
        prop_assert_eq!(DependencyKey::named(name.as_str()), DependencyKey::named(name.clone()));
        prop_assert_ne!(DependencyKey::symbol(name.as_str()), DependencyKey::symbol(name.as_str()));
        prop_assert_ne!(DependencyKey::symbol(name.as_str()), DependencyKey::named(name.as_str()));
    }
}
