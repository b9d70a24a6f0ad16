//! Scoped ownership of a channel factory.

use crate::channel::ChannelFactory;

/// Disposes the wrapped factory exactly once: explicitly through
/// [`FactoryScope::dispose`], or on drop if that never happened (early
/// return, panic unwinding, or the invocation future being dropped).
pub struct FactoryScope<F: ChannelFactory> {
    factory: F,
    released: bool,
}

impl<F: ChannelFactory> FactoryScope<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            released: false,
        }
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn dispose(&mut self) {
        if !self.released {
            self.released = true;
            self.factory.dispose();
        }
    }
}

impl<F: ChannelFactory> Drop for FactoryScope<F> {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!("disposing channel factory on scope exit");
        }
        self.dispose();
    }
}
