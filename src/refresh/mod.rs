mod coordinator;

pub(crate) use coordinator::RefreshCoordinator;
