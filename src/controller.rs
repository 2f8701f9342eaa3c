//! Controllers: one type serving the verbs of one resource.
//!
//! There is no method-name inspection. A controller lists the [`Action`]s it
//! serves and the registration table below turns each one into a route:
//!
//! | Action     | Method | Route            |
//! |------------|--------|------------------|
//! | `Get`      | GET    | `path`           |
//! | `GetBy`    | GET    | `path/:param1`   |
//! | `Post`     | POST   | `path`           |
//! | `PostBy`   | POST   | `path/:param1`   |
//! | `Put`      | PUT    | `path`           |
//! | `PutBy`    | PUT    | `path/:param1`   |
//! | `Delete`   | DELETE | `path`           |
//! | `DeleteBy` | DELETE | `path/:param1`   |
//! | `Patch`    | PATCH  | `path`           |
//! | `PatchBy`  | PATCH  | `path/:param1`   |

use std::sync::Arc;

use crate::context::Context;
use crate::handler::Handler;
use crate::method::Method;

/// Name of the path parameter `*By` actions receive.
pub const ID_PARAM: &str = "param1";

/// A controller action.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Get,
    GetBy,
    Post,
    PostBy,
    Put,
    PutBy,
    Delete,
    DeleteBy,
    Patch,
    PatchBy,
}

impl Action {
    pub fn method(self) -> Method {
        match self {
            Self::Get    | Self::GetBy    => Method::Get,
            Self::Post   | Self::PostBy   => Method::Post,
            Self::Put    | Self::PutBy    => Method::Put,
            Self::Delete | Self::DeleteBy => Method::Delete,
            Self::Patch  | Self::PatchBy  => Method::Patch,
        }
    }

    /// `true` for the `*By` actions, routed with a trailing `:param1`.
    pub fn takes_id(self) -> bool {
        matches!(
            self,
            Self::GetBy | Self::PostBy | Self::PutBy | Self::DeleteBy | Self::PatchBy
        )
    }
}

/// A resource controller.
///
/// ```rust
/// use trellis::{Action, Context, Controller, Method, Mux, Request};
///
/// struct Users;
///
/// impl Controller for Users {
///     fn actions(&self) -> &[Action] {
///         &[Action::Get, Action::GetBy]
///     }
///
///     fn serve(&self, action: Action, id: Option<String>, ctx: &mut Context) {
///         match (action, id) {
///             (Action::GetBy, Some(id)) => ctx.write_str(&format!("user {id}")),
///             _ => ctx.write_str("all users"),
///         }
///     }
/// }
///
/// let mut mux = Mux::new();
/// mux.controller("/users", Users).unwrap();
///
/// let res = mux.serve(Request::new(Method::Get, "localhost", "/users/7"));
/// assert_eq!(res.text(), "user 7");
/// ```
pub trait Controller: Send + Sync + 'static {
    /// The actions this controller serves. Only these are routed.
    fn actions(&self) -> &[Action];

    /// Serves one action. `id` is the `:param1` segment for `*By` actions.
    fn serve(&self, action: Action, id: Option<String>, ctx: &mut Context);
}

// The chain unit registered for one action of a controller.
pub(crate) struct ControllerAction<C> {
    controller: Arc<C>,
    action: Action,
}

impl<C> ControllerAction<C> {
    pub(crate) fn new(controller: Arc<C>, action: Action) -> Self {
        Self { controller, action }
    }
}

impl<C: Controller> Handler for ControllerAction<C> {
    fn serve(&self, ctx: &mut Context) {
        let id = if self.action.takes_id() {
            ctx.param(ID_PARAM).map(str::to_owned)
        } else {
            None
        };
        self.controller.serve(self.action, id, ctx);
    }
}
