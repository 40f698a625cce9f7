// Copyright 2016 Matthew Collins
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Runs a blocking operation with a hard wall clock limit. Returns
/// `None` when the limit passes first; the worker thread is left to
/// finish on its own and its result is dropped.
pub fn perform<T, F>(f: F, limit: Duration) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver may be gone if the deadline already passed.
        let _ = tx.send(f());
    });
    rx.recv_timeout(limit).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_operations_finish() {
        assert_eq!(perform(|| 7, Duration::from_secs(5)), Some(7));
    }

    #[test]
    fn slow_operations_time_out() {
        let res = perform(
            || {
                thread::sleep(Duration::from_secs(2));
                7
            },
            Duration::from_millis(50),
        );
        assert_eq!(res, None);
    }
}
