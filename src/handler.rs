//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A trie node holds a chain of units of *different* concrete types: a
//! closure, a controller action, a user struct. Rust collections can only
//! hold one concrete type, so every unit is erased to `dyn Handler` and the
//! chain is stored uniformly as a shared slice:
//!
//! ```text
//! fn hello(ctx: &mut Context) { … }         ← user writes this
//!        ↓ mux.get("/", hello)
//! hello.boxed()                            ← Handler blanket impl
//!        ↓  Arc<dyn Handler>
//! Arc<[BoxedHandler]>                      ← the chain, owned by the trie node
//!        ↓
//! chain[i].serve(ctx)  at request time     ← one vtable dispatch per unit
//! ```
//!
//! Chains are immutable once registered, so the same `Arc` is handed to every
//! concurrent request. The per-request cost is one atomic increment.

use std::sync::Arc;

use crate::context::Context;

/// A unit of a handler chain.
///
/// Automatically implemented for any `Fn(&mut Context)` closure or function.
/// Implement it yourself for handler objects that carry their own state:
///
/// ```rust
/// use trellis::{Context, Handler};
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// impl Handler for Greeter {
///     fn serve(&self, ctx: &mut Context) {
///         let name = ctx.param("name").unwrap_or("stranger").to_owned();
///         ctx.write_str(&format!("{}, {name}", self.greeting));
///     }
/// }
/// ```
///
/// A middleware unit calls [`Context::next`] to continue the chain. A unit
/// that returns without calling it stops the chain.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, ctx: &mut Context);

    /// Erases the concrete type.
    fn boxed(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn serve(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// A type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// An immutable middleware + handler sequence. The last unit is the terminal
/// handler; every unit before it is middleware.
pub type Chain = Arc<[BoxedHandler]>;
