use anyhow::Result;

use crate::driver::traits::{BrowserDriver, FrameTarget};
use crate::parser::types::{LocatorRef, Strategy};

/// A locator compiled down to the driver's query surface: a frame, a
/// selector string and a document-order index among the matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub frame: FrameTarget,
    pub query: String,
    pub index: usize,
}

/// Compile a locator reference into a driver query. Pure and deterministic:
/// the same locator always yields the same query.
pub fn compile(locator: &LocatorRef) -> Resolved {
    let query = match &locator.strategy {
        Strategy::Text(text) => format!("text=\"{}\"", text),
        Strategy::Css(css) => css.clone(),
        Strategy::XPath(xpath) => format!("xpath={}", xpath),
        Strategy::Id(id) => format!("#{}", id),
        Strategy::Placeholder(placeholder) => format!("[placeholder=\"{}\"]", placeholder),
        Strategy::Role(role) => format!("[role=\"{}\"]", role),
    };

    Resolved {
        frame: match locator.frame {
            Some(i) => FrameTarget::Child(i),
            None => FrameTarget::Main,
        },
        query,
        index: locator.index,
    }
}

/// Resolve a locator against the live page. `Ok(Some)` when the index-th
/// match exists right now, `Ok(None)` on a clean miss, `Err` only when the
/// driver itself fails.
pub async fn resolve(
    driver: &dyn BrowserDriver,
    locator: &LocatorRef,
) -> Result<Option<Resolved>> {
    let resolved = compile(locator);
    let count = driver.count_matches(resolved.frame, &resolved.query).await?;
    if resolved.index < count {
        Ok(Some(resolved))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    fn locator(strategy: Strategy) -> LocatorRef {
        LocatorRef {
            strategy,
            index: 0,
            frame: None,
        }
    }

    #[test]
    fn test_compile_strategies() {
        let cases = [
            (Strategy::Text("Login".into()), "text=\"Login\""),
            (Strategy::Css("button.primary".into()), "button.primary"),
            (Strategy::XPath("//div[@x]".into()), "xpath=//div[@x]"),
            (Strategy::Id("submit".into()), "#submit"),
            (
                Strategy::Placeholder("Password".into()),
                "[placeholder=\"Password\"]",
            ),
            (Strategy::Role("button".into()), "[role=\"button\"]"),
        ];
        for (strategy, expected) in cases {
            assert_eq!(compile(&locator(strategy)).query, expected);
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let l = LocatorRef {
            strategy: Strategy::Text("Save".into()),
            index: 2,
            frame: Some(1),
        };
        let first = compile(&l);
        let second = compile(&l);
        assert_eq!(first, second);
        assert_eq!(first.frame, FrameTarget::Child(1));
        assert_eq!(first.index, 2);
    }

    #[tokio::test]
    async fn test_resolve_hit_and_miss() {
        let driver = MockDriver::new().with_match("text=\"Login\"", 2);

        let hit = resolve(&driver, &locator(Strategy::Text("Login".into())))
            .await
            .unwrap();
        assert!(hit.is_some());

        let mut indexed = locator(Strategy::Text("Login".into()));
        indexed.index = 1;
        assert!(resolve(&driver, &indexed).await.unwrap().is_some());

        indexed.index = 2;
        assert!(resolve(&driver, &indexed).await.unwrap().is_none());

        let miss = resolve(&driver, &locator(Strategy::Text("Logout".into())))
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_resolve_propagates_driver_failure() {
        let driver = MockDriver::new().with_fault();
        let err = resolve(&driver, &locator(Strategy::Text("Login".into()))).await;
        assert!(err.is_err());
    }
}
