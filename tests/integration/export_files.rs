//! Saving stories as plain-text files.

use storyloom::export::StoryExport;
use storyloom::story::Story;
use tempfile::TempDir;

#[test]
fn test_write_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested/stories/owl.txt");
    let story = Story::draft("The Owl", "Hoo hoo.", "Listen well.");

    let written = StoryExport::write(&target, &story).unwrap();
    assert_eq!(written, target);
    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.starts_with(&"=".repeat(60)));
    assert!(text.contains("\nThe Owl\n"));
    assert!(text.contains("\nMoral: Listen well.\n"));
    assert!(text.ends_with(&format!("{}\n", "=".repeat(60))));
}

#[test]
fn test_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("story.txt");
    StoryExport::write(&target, &Story::draft("First", "One.", "")).unwrap();
    StoryExport::write(&target, &Story::draft("Second", "Two.", "")).unwrap();

    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.contains("Second"));
    assert!(!text.contains("First"));
}
