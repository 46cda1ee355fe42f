#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    /// A single header occurrence.
    pub fn single(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Single, file)
    }

    /// A list header, possibly spread over several occurrences.
    pub fn list(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::List, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }
}

/// A resource file holding one raw header value per line.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// Every header occurrence in the file, blank lines skipped.
    pub fn values(&self) -> Vec<&'static str> {
        self.content.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
    }

    /// Total length of the header occurrences, in bytes.
    pub fn value_bytes(&self) -> u64 {
        self.values().iter().map(|value| value.len() as u64).sum()
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Single,
    List,
}

impl TestGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::List => "list",
        }
    }
}
