/// One of the counters kept on an [super::Event].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Views,
    Likes,
    Comments,
}

impl Counter {
    /// Name of the field on the event document.
    pub fn field(self) -> &'static str {
        match self {
            Counter::Views => "viewsCount",
            Counter::Likes => "likesCount",
            Counter::Comments => "commentsCount",
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}
