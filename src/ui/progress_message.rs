/// Events sent from an import to the progress renderer thread
#[derive(Clone, Debug)]
pub enum ProgressMessage {
    Started { total: usize },
    Progress { current: usize, percentage: u8, label: String },
    Finished,
}
