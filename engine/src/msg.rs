//! Emitting messages about game events to the UI layer

use std::sync::{
    mpsc::{self, Sender},
    LazyLock, Mutex,
};

use derive_more::Deref;

static RCV: LazyLock<Mutex<Option<Sender<String>>>> =
    LazyLock::new(Default::default);

/// Receiving end for game narration, hook up before running the simulation.
#[derive(Deref)]
pub struct Receiver(mpsc::Receiver<String>);

impl Default for Receiver {
    fn default() -> Self {
        let (send, recv) = mpsc::channel();
        *RCV.lock().unwrap() = Some(send);
        Receiver(recv)
    }
}

pub fn send_msg(text: String) {
    let mut rcv = RCV.lock().unwrap();
    if let Some(ref sender) = *rcv {
        if sender.send(text).is_err() {
            // Receiver was dropped, stop sending.
            *rcv = None;
        }
    }
}

#[macro_export]
macro_rules! msg {
    // NB. Even the simple case needs to be wrapped in `format!` in case the
    // fmt string is doing named variable capture.
    ($fmt:expr) => {
        $crate::send_msg(format!($fmt))
    };

    ($fmt:expr, $($arg:expr),* $(,)?) => {
        $crate::send_msg(format!($fmt, $($arg),*))
    };
}
