//! Schedulable tasks: a plain function plus an optional opaque context

/// Opaque word handed back to a contextual callback
///
/// Typically a slot index or the address of a `'static` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Context(pub usize);

impl Context {
    pub const NONE: Self = Self(0);
}

/// Function invoked when a sleeper wakes
#[derive(Debug, Clone, Copy)]
pub enum Callback {
    Bare(fn()),
    Contextual(fn(Context)),
}

// Compared by address: cancel/reset locate sleepers by value.
impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bare(a), Self::Bare(b)) => *a as usize == *b as usize,
            (Self::Contextual(a), Self::Contextual(b)) => *a as usize == *b as usize,
            _ => false,
        }
    }
}

impl Eq for Callback {}

/// A callback bound to its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    callback: Callback,
    context: Context,
}

impl Task {
    /// Task calling `f()` with no context
    pub const fn bare(f: fn()) -> Self {
        Self {
            callback: Callback::Bare(f),
            context: Context::NONE,
        }
    }

    /// Task calling `f(context)`
    pub const fn with_context(f: fn(Context), context: Context) -> Self {
        Self {
            callback: Callback::Contextual(f),
            context,
        }
    }

    pub const fn callback(&self) -> Callback {
        self.callback
    }

    pub const fn context(&self) -> Context {
        self.context
    }

    /// Invoke the callback
    pub fn run(&self) {
        match self.callback {
            Callback::Bare(f) => f(),
            Callback::Contextual(f) => f(self.context),
        }
    }
}
