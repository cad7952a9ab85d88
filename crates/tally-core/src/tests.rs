#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::effects::*;
    use crate::reactive::*;
    use crate::scope::*;

    fn counter() -> (Rc<Cell<usize>>, impl Fn() + Clone) {
        let runs = Rc::new(Cell::new(0));
        let bump = {
            let runs = runs.clone();
            move || runs.set(runs.get() + 1)
        };
        (runs, bump)
    }

    #[test]
    fn test_signal_basic() {
        let rt = Runtime::new();
        let sig = rt.create_signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert_eq!(sig.with(|v| *v * 2), 202);
    }

    #[test]
    fn test_effect_runs_once_on_create() {
        let rt = Runtime::new();
        let sig = rt.create_signal(1);
        let (runs, bump) = counter();

        let fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
                bump();
            }
        });

        assert_eq!(runs.get(), 1);
        assert!(fx.is_alive());
        assert_eq!(rt.subscriber_count(sig.id()), 1);
        assert_eq!(rt.dependency_count(fx.id()), 1);
    }

    #[test]
    fn test_write_is_deferred_until_flush() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _fx = rt.create_effect({
            let sig = sig.clone();
            let seen = seen.clone();
            move || seen.borrow_mut().push(sig.get())
        });

        sig.set(7);
        assert_eq!(*seen.borrow(), vec![0]);
        assert_eq!(rt.pending_count(), 1);

        rt.flush();
        assert_eq!(*seen.borrow(), vec![0, 7]);
        assert_eq!(rt.pending_count(), 0);
    }

    #[test]
    fn test_writes_coalesce_into_one_run() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _fx = rt.create_effect({
            let sig = sig.clone();
            let seen = seen.clone();
            move || seen.borrow_mut().push(sig.get())
        });

        for i in 1..=5 {
            sig.set(i);
        }
        assert_eq!(rt.pending_count(), 1);

        rt.flush();
        assert_eq!(*seen.borrow(), vec![0, 5]);
    }

    #[test]
    fn test_effect_reading_two_signals_runs_once() {
        let rt = Runtime::new();
        let a = rt.create_signal(1);
        let b = rt.create_signal(2);
        let (runs, bump) = counter();

        let _fx = rt.create_effect({
            let (a, b) = (a.clone(), b.clone());
            move || {
                let _ = a.get() + b.get();
                bump();
            }
        });

        a.set(10);
        b.set(20);
        rt.flush();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_equal_write_still_notifies() {
        let rt = Runtime::new();
        let sig = rt.create_signal(3);
        let (runs, bump) = counter();

        let _fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
                bump();
            }
        });

        sig.set(3);
        rt.flush();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_dependencies_rebuilt_each_run() {
        let rt = Runtime::new();
        let use_a = rt.create_signal(true);
        let a = rt.create_signal("a");
        let b = rt.create_signal("b");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let fx = rt.create_effect({
            let (use_a, a, b) = (use_a.clone(), a.clone(), b.clone());
            let seen = seen.clone();
            move || {
                let v = if use_a.get() { a.get() } else { b.get() };
                seen.borrow_mut().push(v);
            }
        });
        assert_eq!(rt.dependency_count(fx.id()), 2);

        use_a.set(false);
        rt.flush();
        assert_eq!(rt.subscriber_count(a.id()), 0);
        assert_eq!(rt.subscriber_count(b.id()), 1);

        // `a` is no longer read, so writing it schedules nothing
        a.set("a2");
        assert_eq!(rt.pending_count(), 0);

        b.set("b2");
        rt.flush();
        assert_eq!(*seen.borrow(), vec!["a", "b", "b2"]);
    }

    #[test]
    fn test_untracked_read_does_not_subscribe() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);

        let _fx = rt.create_effect({
            let sig = sig.clone();
            let rt = rt.clone();
            move || {
                rt.untrack(|| sig.get());
                sig.get_untracked();
            }
        });

        assert_eq!(rt.subscriber_count(sig.id()), 0);
        sig.set(1);
        assert_eq!(rt.pending_count(), 0);
    }

    #[test]
    fn test_reads_outside_effects_are_untracked() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        sig.get();
        assert_eq!(rt.subscriber_count(sig.id()), 0);
    }

    #[test]
    fn test_dispose_effect_is_idempotent() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let (runs, bump) = counter();

        let fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
                bump();
            }
        });

        sig.set(1);
        fx.dispose();
        assert_eq!(rt.pending_count(), 0);
        assert_eq!(rt.subscriber_count(sig.id()), 0);

        fx.dispose();
        rt.flush();
        sig.set(2);
        rt.flush();
        assert_eq!(runs.get(), 1);
        assert!(!fx.is_alive());
    }

    #[test]
    fn test_disposed_signal_schedules_nothing() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let (runs, bump) = counter();

        let _fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
                bump();
            }
        });

        sig.dispose();
        sig.set(5);
        assert_eq!(sig.get_untracked(), 5);
        assert_eq!(rt.pending_count(), 0);
        rt.flush();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_host_scheduler_requested_once_per_batch() {
        let rt = Runtime::new();
        let requests = Rc::new(Cell::new(0));
        rt.set_host_scheduler({
            let requests = requests.clone();
            move || requests.set(requests.get() + 1)
        });

        let sig = rt.create_signal(0);
        let _fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
            }
        });

        sig.set(1);
        sig.set(2);
        assert_eq!(requests.get(), 1);

        rt.flush();
        sig.set(3);
        assert_eq!(requests.get(), 2);
    }

    #[test]
    fn test_host_scheduler_may_flush_synchronously() {
        let rt = Runtime::new();
        rt.set_host_scheduler({
            let rt = rt.clone();
            move || rt.flush()
        });

        let sig = rt.create_signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _fx = rt.create_effect({
            let sig = sig.clone();
            let seen = seen.clone();
            move || seen.borrow_mut().push(sig.get())
        });

        sig.set(1);
        assert_eq!(*seen.borrow(), vec![0, 1]);
        rt.clear_host_scheduler();
    }

    #[test]
    fn test_effect_scheduled_during_flush_runs_same_flush() {
        let rt = Runtime::new();
        let source = rt.create_signal(1);
        let doubled = rt.create_signal(2);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _derive = rt.create_effect({
            let (source, doubled) = (source.clone(), doubled.clone());
            move || doubled.set(source.get() * 2)
        });
        let _render = rt.create_effect({
            let doubled = doubled.clone();
            let seen = seen.clone();
            move || seen.borrow_mut().push(doubled.get())
        });
        // creation of `_derive` wrote `doubled` before `_render` existed
        assert_eq!(rt.pending_count(), 0);

        source.set(4);
        rt.flush();
        assert_eq!(*seen.borrow(), vec![2, 8]);
        assert_eq!(rt.pending_count(), 0);
    }

    #[test]
    fn test_nested_flush_is_noop() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let (runs, bump) = counter();

        let _fx = rt.create_effect({
            let sig = sig.clone();
            let rt = rt.clone();
            move || {
                sig.get();
                rt.flush();
                bump();
            }
        });

        sig.set(1);
        rt.flush();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_self_rescheduling_effect_gives_up() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0u32);

        let _fx = rt.create_effect({
            let sig = sig.clone();
            move || {
                let v = sig.get();
                sig.set(v + 1);
            }
        });
        assert_eq!(sig.get_untracked(), 1);

        rt.flush();
        assert_eq!(sig.get_untracked(), 1 + MAX_FLUSH_ROUNDS as u32);
        assert_eq!(rt.pending_count(), 0);
    }

    #[test]
    fn test_effect_disposing_itself_mid_run() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let slot: Rc<RefCell<Option<EffectHandle>>> = Rc::new(RefCell::new(None));

        let fx = rt.create_effect({
            let sig = sig.clone();
            let slot = slot.clone();
            move || {
                if sig.get() > 0
                    && let Some(me) = slot.borrow().as_ref()
                {
                    me.dispose();
                }
            }
        });
        *slot.borrow_mut() = Some(fx.clone());

        sig.set(1);
        rt.flush();
        assert!(!fx.is_alive());
        assert_eq!(rt.effect_count(), 0);
    }

    #[test]
    fn test_scope_explicit_dispose() {
        let rt = Runtime::new();
        let cleaned_up = Rc::new(Cell::new(false));

        let scope = Scope::new(&rt);
        let sig = scope.create_signal(0);
        let fx = scope.create_effect({
            let sig = sig.clone();
            move || {
                sig.get();
            }
        });
        scope.add_disposer({
            let cleaned_up = cleaned_up.clone();
            move || cleaned_up.set(true)
        });

        assert!(!cleaned_up.get());
        scope.dispose();
        assert!(cleaned_up.get());
        assert!(!fx.is_alive());
        assert_eq!(rt.signal_count(), 0);

        // second dispose is a no-op
        scope.dispose();
        sig.set(1);
        assert_eq!(rt.pending_count(), 0);
    }

    #[test]
    fn test_scope_children_disposed_first() {
        let rt = Runtime::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let parent = Scope::new(&rt);
        let child = parent.child();
        parent.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("parent")
        });
        child.add_disposer({
            let order = order.clone();
            move || order.borrow_mut().push("child")
        });

        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
        assert!(child.is_disposed());
    }

    #[test]
    fn test_scope_drop_disposes() {
        let rt = Runtime::new();
        let sig = rt.create_signal(0);
        let fx = {
            let scope = Scope::new(&rt);
            scope.create_effect({
                let sig = sig.clone();
                move || {
                    sig.get();
                }
            })
        };
        assert!(!fx.is_alive());
        assert_eq!(rt.subscriber_count(sig.id()), 0);
    }

    #[test]
    fn test_disposer_on_disposed_scope_runs_now() {
        let rt = Runtime::new();
        let scope = Scope::new(&rt);
        scope.dispose();

        let ran = Rc::new(Cell::new(false));
        scope.add_disposer({
            let ran = ran.clone();
            move || ran.set(true)
        });
        assert!(ran.get());
    }

    #[test]
    fn test_dispose_runs_at_most_once() {
        let (runs, bump) = counter();
        let d = on_unmount(bump);
        assert!(!d.is_spent());
        d.run();
        d.clone().run();
        assert_eq!(runs.get(), 1);
        assert!(d.is_spent());
    }
}
