//! # Worker population and slot layout.
//!
//! The population is fixed for the lifetime of the process:
//!
//! ```text
//! servers      = len(ports) + (1 if balancer)
//! scheduler_id = servers
//! count        = servers + 1 + pool
//!
//! id:   0 ........ servers-1 | servers   | servers+1 .... count-1
//! role: [balancer] server... | scheduler | pool-worker ...
//! ```
//!
//! When the balancer is enabled it takes slot 0 and servers start at slot 1;
//! server slot `id` listens on `ports[id - offset]`.

use std::fmt;

use crate::config::ServerConfig;

/// What a slot is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Front balancer (slot 0 when enabled).
    Balancer,
    /// HTTP server bound to one configured port.
    Server,
    /// Single scheduler thread receiving `task` messages.
    Scheduler,
    /// Task-execution worker managed by the pool.
    PoolWorker,
}

impl Role {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Balancer => "balancer",
            Role::Server => "server",
            Role::Scheduler => "scheduler",
            Role::PoolWorker => "pool-worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed identity of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot id in `[0, count)`.
    pub id: usize,
    /// Role derived from the id.
    pub role: Role,
    /// Listening port, for server slots.
    pub port: Option<u16>,
}

/// Slot layout computed from the server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    balancer: bool,
    ports: Vec<u16>,
    pool: usize,
}

impl Population {
    /// Computes the layout for a server configuration.
    pub fn new(server: &ServerConfig) -> Self {
        Self {
            balancer: server.balancer,
            ports: server.ports.clone(),
            pool: server.workers.pool,
        }
    }

    /// Number of balancer + server slots.
    pub fn servers(&self) -> usize {
        self.ports.len() + usize::from(self.balancer)
    }

    /// Slot id of the scheduler.
    pub fn scheduler_id(&self) -> usize {
        self.servers()
    }

    /// Number of pool workers.
    pub fn pool_size(&self) -> usize {
        self.pool
    }

    /// Total number of slots.
    pub fn count(&self) -> usize {
        self.servers() + 1 + self.pool
    }

    /// Role of slot `id`; `None` when out of range.
    pub fn role_of(&self, id: usize) -> Option<Role> {
        let scheduler = self.scheduler_id();
        if id >= self.count() {
            None
        } else if id == scheduler {
            Some(Role::Scheduler)
        } else if id > scheduler {
            Some(Role::PoolWorker)
        } else if self.balancer && id == 0 {
            Some(Role::Balancer)
        } else {
            Some(Role::Server)
        }
    }

    /// Port a server slot listens on.
    pub fn port_of(&self, id: usize) -> Option<u16> {
        match self.role_of(id)? {
            Role::Server => self.ports.get(id - usize::from(self.balancer)).copied(),
            _ => None,
        }
    }

    /// Slot description for `id`.
    pub fn slot(&self, id: usize) -> Option<SlotInfo> {
        Some(SlotInfo {
            id,
            role: self.role_of(id)?,
            port: self.port_of(id),
        })
    }

    /// All slots in ascending id order.
    pub fn slots(&self) -> impl Iterator<Item = SlotInfo> + '_ {
        (0..self.count()).filter_map(|id| self.slot(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkersConfig;

    fn server(balancer: bool, ports: &[u16], pool: usize) -> ServerConfig {
        ServerConfig {
            balancer,
            ports: ports.to_vec(),
            workers: WorkersConfig { pool, wait: None },
            ..ServerConfig::default()
        }
    }

    #[test]
    fn count_matches_formula() {
        for balancer in [false, true] {
            for ports in 0..4u16 {
                for pool in 0..4 {
                    let list: Vec<u16> = (1..=ports).map(|p| 8000 + p).collect();
                    let pop = Population::new(&server(balancer, &list, pool));
                    let expected = list.len() + usize::from(balancer) + 1 + pool;
                    assert_eq!(pop.count(), expected);

                    let schedulers: Vec<_> =
                        pop.slots().filter(|s| s.role == Role::Scheduler).collect();
                    assert_eq!(schedulers.len(), 1);
                    assert_eq!(schedulers[0].id, pop.scheduler_id());
                    assert_eq!(
                        pop.slots().filter(|s| s.role == Role::PoolWorker).count(),
                        pool
                    );
                }
            }
        }
    }

    #[test]
    fn balancer_takes_slot_zero() {
        let pop = Population::new(&server(true, &[8001, 8002], 2));
        let roles: Vec<Role> = pop.slots().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Balancer,
                Role::Server,
                Role::Server,
                Role::Scheduler,
                Role::PoolWorker,
                Role::PoolWorker
            ]
        );
        assert_eq!(pop.port_of(0), None);
        assert_eq!(pop.port_of(1), Some(8001));
        assert_eq!(pop.port_of(2), Some(8002));
        assert_eq!(pop.role_of(6), None);
    }

    #[test]
    fn servers_map_to_ports_without_balancer() {
        let pop = Population::new(&server(false, &[80, 81], 0));
        assert_eq!(pop.port_of(0), Some(80));
        assert_eq!(pop.port_of(1), Some(81));
        assert_eq!(pop.role_of(2), Some(Role::Scheduler));
        assert_eq!(pop.count(), 3);
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::PoolWorker.to_string(), "pool-worker");
        assert_eq!(Role::Balancer.as_str(), "balancer");
    }
}
