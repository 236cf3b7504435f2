//! This module provides ways to tweak mocked Classroom sources, so that they can return errors on some tests
#![cfg(any(test, feature = "mock_classroom"))]

use crate::error::{Error, Result};

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    pub list_courses_behaviour: (u32, u32),
    pub list_coursework_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_list_courses(&mut self) -> Result<()> {
        decrement(&mut self.list_courses_behaviour, "list_courses")
    }
    pub fn can_list_coursework(&mut self) -> Result<()> {
        decrement(&mut self.list_coursework_behaviour, "list_coursework")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return an API error and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<()> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(Error::Api{
                url: format!("mock://{}", descr),
                status: 503,
                message: format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value),
            })
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}
