use super::super::types::{CallerId, ServerId, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Idle,
    Busy,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub id: ServerId,
    pub status: ServerStatus,
    /// Time the server entered its current status
    pub entered_at: SimTime,
    /// Busy time accumulated over completed services
    pub busy_time: f64,
    /// Caller being served; `Some` exactly when busy
    pub occupant: Option<CallerId>,
}

/// The single pool of servers shared by both queues
#[derive(Debug, Clone)]
pub struct ServerPool {
    servers: Vec<Server>,
}

impl ServerPool {
    pub fn new(count: usize) -> Self {
        let servers = (0..count as u32)
            .map(|i| Server {
                id: ServerId::new(i),
                status: ServerStatus::Idle,
                entered_at: 0.0,
                busy_time: 0.0,
                occupant: None,
            })
            .collect();
        Self { servers }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn get(&self, id: ServerId) -> &Server {
        &self.servers[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Server> {
        self.servers.iter()
    }

    pub fn busy_count(&self) -> usize {
        self.servers.iter().filter(|s| s.status == ServerStatus::Busy).count()
    }

    /// Idle server with the most accumulated idle time (`now - busy_time`).
    ///
    /// Servers are scanned from the highest index down and a tie replaces the
    /// current pick, so ties go to the lowest index.
    pub fn longest_idle(&self, now: SimTime) -> Option<ServerId> {
        let mut best = None;
        let mut best_idle = 0.0;
        for server in self.servers.iter().rev() {
            let idle = now - server.busy_time;
            if server.status == ServerStatus::Idle && idle >= best_idle {
                best = Some(server.id);
                best_idle = idle;
            }
        }
        best
    }

    /// Start serving `caller` on an idle server
    pub fn bind(&mut self, id: ServerId, caller: CallerId, now: SimTime) {
        let server = &mut self.servers[id.index()];
        debug_assert!(server.occupant.is_none(), "{} already serving", server.id);
        server.status = ServerStatus::Busy;
        server.entered_at = now;
        server.occupant = Some(caller);
    }

    /// Finish the current service, crediting its busy time; the server is left idle
    pub fn release(&mut self, id: ServerId, now: SimTime) -> Option<CallerId> {
        let server = &mut self.servers[id.index()];
        if server.status == ServerStatus::Busy {
            server.busy_time += now - server.entered_at;
        }
        server.status = ServerStatus::Idle;
        server.entered_at = now;
        server.occupant.take()
    }

    /// Mean fraction of [0, now] each server spent busy, counting services still in progress
    pub fn utilization(&self, now: SimTime) -> Option<f64> {
        if self.servers.is_empty() || now <= 0.0 {
            return None;
        }
        let total: f64 = self
            .servers
            .iter()
            .map(|s| {
                let in_progress = match s.status {
                    ServerStatus::Busy => now - s.entered_at,
                    ServerStatus::Idle => 0.0,
                };
                (s.busy_time + in_progress) / now
            })
            .sum();
        Some(total / self.servers.len() as f64)
    }
}
