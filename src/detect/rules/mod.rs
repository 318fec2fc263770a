//! Built-in analyzers, one per usability heuristic.

mod density;
mod destructive;
mod errors;
mod exit;
mod help;
mod layout;
mod loading;
mod navigation;
mod recognition;
mod shortcuts;

pub use density::VisualDensity;
pub use destructive::DestructiveAction;
pub use errors::ErrorRecognition;
pub use exit::ExitUndo;
pub use help::HelpDocumentation;
pub use layout::LayoutConsistency;
pub use loading::LoadingFeedback;
pub use navigation::NavigationTrail;
pub use recognition::RecognitionCues;
pub use shortcuts::KeyboardShortcuts;

use crate::config::RuleSettings;

use super::Analyzer;

/// The built-in analyzers in registration order.
pub fn builtin(settings: &RuleSettings) -> Vec<Box<dyn Analyzer>> {
    vec![
        Box::new(NavigationTrail::new(settings)),
        Box::new(LoadingFeedback::new(settings)),
        Box::new(ExitUndo),
        Box::new(LayoutConsistency::new(settings)),
        Box::new(DestructiveAction::new(settings)),
        Box::new(RecognitionCues::new(settings)),
        Box::new(KeyboardShortcuts),
        Box::new(VisualDensity::new(settings)),
        Box::new(ErrorRecognition),
        Box::new(HelpDocumentation),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_names_unique() {
        let analyzers = builtin(&RuleSettings::default());
        assert_eq!(analyzers.len(), 10);
        let names: HashSet<_> = analyzers.iter().map(|a| a.name().to_string()).collect();
        assert_eq!(names.len(), 10);
        let categories: HashSet<_> = analyzers.iter().map(|a| a.category()).collect();
        assert_eq!(categories.len(), 10);
    }

    #[test]
    fn test_idempotent() {
        let src = r#"
export function Settings() {
  const remove = () => api.delete('/me');
  return (
    <Page>
      <nav><a href="/a">A</a></nav>
      <div className="bg-gray-100 p-2">x</div>
      <button className="bg-gray-100 p-2" onClick={remove}>Delete</button>
    </Page>
  );
}
"#;
        for analyzer in builtin(&RuleSettings::default()) {
            let first = testing::run(analyzer.as_ref(), src);
            let second = testing::run(analyzer.as_ref(), src);
            assert_eq!(first, second, "{}", analyzer.name());
        }
    }
}
