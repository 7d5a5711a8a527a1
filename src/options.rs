#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub shelves: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

pub struct RunOptions {
    pub extract_options: Option<ExtractOptions>,
    pub output: Option<String>,
}
