#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use graph_studio::status::StatusQueue;
use graph_studio::worker::execute;
use graph_studio::{ApiRequest, Dispatch, GraphsModal, InMemoryGraphApi, Reply, Ticket};

/// Runs every request inline against the in-memory store and holds the
/// replies until the test delivers them.
pub struct Immediate {
    pub api: Arc<InMemoryGraphApi>,
    next: Ticket,
    queue: VecDeque<Reply>,
}

impl Immediate {
    pub fn new(api: InMemoryGraphApi) -> Self {
        Self {
            api: Arc::new(api),
            next: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn take(&mut self) -> Vec<Reply> {
        self.queue.drain(..).collect()
    }
}

impl Dispatch for Immediate {
    fn dispatch(&mut self, req: ApiRequest) -> Ticket {
        self.next += 1;
        let result = execute(self.api.as_ref(), req);
        self.queue.push_back(Reply {
            ticket: self.next,
            result,
        });
        self.next
    }
}

/// Delivers replies to the modal until no request is left.
pub fn settle(modal: &mut GraphsModal, d: &mut Immediate, status: &mut StatusQueue) {
    loop {
        let replies = d.take();
        if replies.is_empty() {
            break;
        }
        for reply in replies {
            modal.handle_reply(reply, d, status);
        }
    }
}
