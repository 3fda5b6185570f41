//! Security manager glue: Just Works pairing with bonds kept in RAM.
//!
//! Bonds survive reconnections but not a power cycle. Besides the
//! encryption keys, each bond keeps the GATT system attributes (CCCD
//! state) so a returning central does not have to re-subscribe.

use core::cell::RefCell;

use crate::config::MAX_BONDED_PEERS;
use defmt::{debug, info, warn};
use heapless::Vec;
use nrf_softdevice::ble::gatt_server;
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{Connection, EncryptionInfo, IdentityKey, MasterId, SecurityMode};
use static_cell::StaticCell;

/// Room for the CCCDs of every notifiable characteristic.
const SYS_ATTRS_LEN: usize = 62;

struct PeerBond {
    master_id: MasterId,
    key: EncryptionInfo,
    peer_id: IdentityKey,
    sys_attrs: Vec<u8, SYS_ATTRS_LEN>,
}

pub struct Bonder {
    peers: RefCell<Vec<PeerBond, MAX_BONDED_PEERS>>,
}

impl Bonder {
    fn new() -> Self {
        Self {
            peers: RefCell::new(Vec::new()),
        }
    }
}

impl SecurityHandler for Bonder {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        true
    }

    fn on_bonded(
        &self,
        _conn: &Connection,
        master_id: MasterId,
        key: EncryptionInfo,
        peer_id: IdentityKey,
    ) {
        let mut peers = self.peers.borrow_mut();
        if let Some(existing) = peers.iter_mut().find(|p| p.master_id == master_id) {
            existing.key = key;
            existing.peer_id = peer_id;
            existing.sys_attrs.clear();
            info!("Bond refreshed");
            return;
        }

        if peers.is_full() {
            warn!("Bond table full - forgetting oldest peer");
            peers.remove(0);
        }

        let _ = peers.push(PeerBond {
            master_id,
            key,
            peer_id,
            sys_attrs: Vec::new(),
        });
        info!("Bonded - {} peers known", peers.len());
    }

    fn get_key(&self, _conn: &Connection, master_id: MasterId) -> Option<EncryptionInfo> {
        self.peers
            .borrow()
            .iter()
            .find_map(|p| (p.master_id == master_id).then_some(p.key))
    }

    fn save_sys_attrs(&self, conn: &Connection) {
        let mut peers = self.peers.borrow_mut();
        let Some(peer) = peers
            .iter_mut()
            .find(|p| p.peer_id.is_match(conn.peer_address()))
        else {
            return;
        };

        let capacity = peer.sys_attrs.capacity();
        if peer.sys_attrs.resize(capacity, 0).is_err() {
            return;
        }
        match gatt_server::get_sys_attrs(conn, &mut peer.sys_attrs) {
            Ok(len) => {
                peer.sys_attrs.truncate(len);
                debug!("Saved {} bytes of system attributes", len);
            }
            Err(_) => {
                warn!("Could not read system attributes");
                peer.sys_attrs.clear();
            }
        }
    }

    fn load_sys_attrs(&self, conn: &Connection) {
        let peers = self.peers.borrow();
        let attrs = peers
            .iter()
            .find(|p| p.peer_id.is_match(conn.peer_address()))
            .and_then(|p| (!p.sys_attrs.is_empty()).then_some(p.sys_attrs.as_slice()));

        if gatt_server::set_sys_attrs(conn, attrs).is_err() {
            warn!("Could not restore system attributes");
        }
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

/// The bond table shared by every connection. Must be called once.
pub fn bonder() -> &'static Bonder {
    static BONDER: StaticCell<Bonder> = StaticCell::new();
    BONDER.init(Bonder::new())
}
