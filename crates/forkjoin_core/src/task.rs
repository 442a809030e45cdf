use crate::Spawner;

/// A unit of work: a closure plus whatever it captured, boxed so the deque
/// can hold tasks of arbitrary shape. The closure's captures are the opaque
/// "user data" of the original C contract; there is nothing else to free,
/// since dropping the box drops the captures.
pub(crate) struct Task(Box<dyn FnOnce(&Spawner) + Send + 'static>);

impl Task {
    pub(crate) fn new(f: impl FnOnce(&Spawner) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn into_inner(self) -> Box<dyn FnOnce(&Spawner) + Send + 'static> {
        self.0
    }

    pub(crate) fn run(self, spawner: &Spawner) {
        (self.0)(spawner)
    }
}
