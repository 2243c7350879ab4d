//! Opcode constants and debug names
//!
//! The session core itself only touches the keep-alive opcodes; the rest of
//! the tables exist so packet tracing can print a readable name next to the
//! raw opcode. Name coverage is the common subset, not the full protocol;
//! unknown opcodes print as numbers.

/// Opcodes for messages received from the server
pub mod recv {
    pub const LOGIN_RESULT: u16 = 0;
    pub const SERVER_STATUS: u16 = 3;
    pub const SERVER_LIST: u16 = 10;
    pub const CHAR_LIST: u16 = 11;
    pub const SERVER_IP: u16 = 12;
    pub const CHARNAME_RESPONSE: u16 = 13;
    pub const ADD_NEWCHAR_ENTRY: u16 = 14;
    pub const DELCHAR_RESPONSE: u16 = 15;
    pub const CHANGE_CHANNEL: u16 = 16;
    pub const PING: u16 = 17;
    pub const RECOMMENDED_WORLDS: u16 = 27;
    pub const MODIFY_INVENTORY: u16 = 29;
    pub const CHANGE_STATS: u16 = 31;
    pub const GIVE_BUFF: u16 = 32;
    pub const CANCEL_BUFF: u16 = 33;
    pub const UPDATE_SKILL: u16 = 36;
    pub const SHOW_STATUS_INFO: u16 = 39;
    pub const SERVER_MESSAGE: u16 = 68;
    pub const SET_FIELD: u16 = 125;
    pub const WHISPER: u16 = 135;
    pub const FIELD_EFFECT: u16 = 138;
    pub const SPAWN_CHAR: u16 = 160;
    pub const REMOVE_CHAR: u16 = 161;
    pub const CHAT_RECEIVED: u16 = 162;
    pub const SPAWN_PET: u16 = 168;
    pub const CHAR_MOVED: u16 = 185;
    pub const ATTACKED_CLOSE: u16 = 186;
    pub const ATTACKED_RANGED: u16 = 187;
    pub const ATTACKED_MAGIC: u16 = 188;
    pub const UPDATE_CHARLOOK: u16 = 197;
    pub const ADD_COOLDOWN: u16 = 234;
    pub const SPAWN_MOB: u16 = 236;
    pub const KILL_MOB: u16 = 237;
    pub const MOB_MOVED: u16 = 239;
    pub const SPAWN_NPC: u16 = 257;
    pub const REMOVE_NPC: u16 = 258;
    pub const NPC_TALK: u16 = 304;
    pub const KEYMAP: u16 = 335;
}

/// Opcodes for messages sent to the server
pub mod send {
    pub const LOGIN: u16 = 1;
    pub const CHAR_LIST_REQUEST: u16 = 5;
    pub const SERVER_STATUS_REQUEST: u16 = 6;
    pub const ACCEPT_TOS: u16 = 7;
    pub const SERVERLIST_REQUEST: u16 = 11;
    pub const SELECT_CHAR: u16 = 19;
    pub const PLAYER_LOGIN: u16 = 20;
    pub const NAME_CHAR: u16 = 21;
    pub const CREATE_CHAR: u16 = 22;
    pub const DELETE_CHAR: u16 = 23;
    pub const PONG: u16 = 24;
    pub const CHANGE_MAP: u16 = 38;
    pub const CHANGE_CHANNEL: u16 = 39;
    pub const MOVE_PLAYER: u16 = 41;
    pub const CLOSE_ATTACK: u16 = 44;
    pub const RANGED_ATTACK: u16 = 45;
    pub const MAGIC_ATTACK: u16 = 46;
    pub const TAKE_DAMAGE: u16 = 48;
    pub const GENERAL_CHAT: u16 = 49;
    pub const TALK_TO_NPC: u16 = 58;
    pub const NPC_SHOP_ACTION: u16 = 61;
    pub const GATHER_ITEMS: u16 = 69;
    pub const SORT_ITEMS: u16 = 70;
    pub const MOVE_ITEM: u16 = 71;
    pub const USE_ITEM: u16 = 72;
    pub const SPEND_AP: u16 = 87;
    pub const USE_SKILL: u16 = 91;
    pub const DROP_MESOS: u16 = 94;
    pub const CHAR_INFO_REQUEST: u16 = 97;
    pub const MOVE_MONSTER: u16 = 188;
    pub const PICKUP_ITEM: u16 = 202;
    pub const CHANGE_KEYMAP: u16 = 135;
}

/// Debug name for a received opcode
pub fn recv_name(opcode: u16) -> Option<&'static str> {
    let name = match opcode {
        recv::LOGIN_RESULT => "LOGIN_RESULT",
        recv::SERVER_STATUS => "SERVER_STATUS",
        recv::SERVER_LIST => "SERVER_LIST",
        recv::CHAR_LIST => "CHAR_LIST",
        recv::SERVER_IP => "SERVER_IP",
        recv::CHARNAME_RESPONSE => "CHARNAME_RESPONSE",
        recv::ADD_NEWCHAR_ENTRY => "ADD_NEWCHAR_ENTRY",
        recv::DELCHAR_RESPONSE => "DELCHAR_RESPONSE",
        recv::CHANGE_CHANNEL => "CHANGE_CHANNEL",
        recv::PING => "PING",
        recv::RECOMMENDED_WORLDS => "RECOMMENDED_WORLDS",
        recv::MODIFY_INVENTORY => "MODIFY_INVENTORY",
        recv::CHANGE_STATS => "CHANGE_STATS",
        recv::GIVE_BUFF => "GIVE_BUFF",
        recv::CANCEL_BUFF => "CANCEL_BUFF",
        recv::UPDATE_SKILL => "UPDATE_SKILL",
        recv::SHOW_STATUS_INFO => "SHOW_STATUS_INFO",
        recv::SERVER_MESSAGE => "SERVER_MESSAGE",
        recv::SET_FIELD => "SET_FIELD",
        recv::WHISPER => "WHISPER",
        recv::FIELD_EFFECT => "FIELD_EFFECT",
        recv::SPAWN_CHAR => "SPAWN_CHAR",
        recv::REMOVE_CHAR => "REMOVE_CHAR",
        recv::CHAT_RECEIVED => "CHAT_RECEIVED",
        recv::SPAWN_PET => "SPAWN_PET",
        recv::CHAR_MOVED => "CHAR_MOVED",
        recv::ATTACKED_CLOSE => "ATTACKED_CLOSE",
        recv::ATTACKED_RANGED => "ATTACKED_RANGED",
        recv::ATTACKED_MAGIC => "ATTACKED_MAGIC",
        recv::UPDATE_CHARLOOK => "UPDATE_CHARLOOK",
        recv::ADD_COOLDOWN => "ADD_COOLDOWN",
        recv::SPAWN_MOB => "SPAWN_MOB",
        recv::KILL_MOB => "KILL_MOB",
        recv::MOB_MOVED => "MOB_MOVED",
        recv::SPAWN_NPC => "SPAWN_NPC",
        recv::REMOVE_NPC => "REMOVE_NPC",
        recv::NPC_TALK => "NPC_TALK",
        recv::KEYMAP => "KEYMAP",
        _ => return None,
    };
    Some(name)
}

/// Debug name for a sent opcode
pub fn send_name(opcode: u16) -> Option<&'static str> {
    let name = match opcode {
        send::LOGIN => "LOGIN",
        send::CHAR_LIST_REQUEST => "CHAR_LIST_REQUEST",
        send::SERVER_STATUS_REQUEST => "SERVER_STATUS_REQUEST",
        send::ACCEPT_TOS => "ACCEPT_TOS",
        send::SERVERLIST_REQUEST => "SERVERLIST_REQUEST",
        send::SELECT_CHAR => "SELECT_CHAR",
        send::PLAYER_LOGIN => "PLAYER_LOGIN",
        send::NAME_CHAR => "NAME_CHAR",
        send::CREATE_CHAR => "CREATE_CHAR",
        send::DELETE_CHAR => "DELETE_CHAR",
        send::PONG => "PONG",
        send::CHANGE_MAP => "CHANGE_MAP",
        send::CHANGE_CHANNEL => "CHANGE_CHANNEL",
        send::MOVE_PLAYER => "MOVE_PLAYER",
        send::CLOSE_ATTACK => "CLOSE_ATTACK",
        send::RANGED_ATTACK => "RANGED_ATTACK",
        send::MAGIC_ATTACK => "MAGIC_ATTACK",
        send::TAKE_DAMAGE => "TAKE_DAMAGE",
        send::GENERAL_CHAT => "GENERAL_CHAT",
        send::TALK_TO_NPC => "TALK_TO_NPC",
        send::NPC_SHOP_ACTION => "NPC_SHOP_ACTION",
        send::GATHER_ITEMS => "GATHER_ITEMS",
        send::SORT_ITEMS => "SORT_ITEMS",
        send::MOVE_ITEM => "MOVE_ITEM",
        send::USE_ITEM => "USE_ITEM",
        send::SPEND_AP => "SPEND_AP",
        send::USE_SKILL => "USE_SKILL",
        send::DROP_MESOS => "DROP_MESOS",
        send::CHAR_INFO_REQUEST => "CHAR_INFO_REQUEST",
        send::MOVE_MONSTER => "MOVE_MONSTER",
        send::PICKUP_ITEM => "PICKUP_ITEM",
        send::CHANGE_KEYMAP => "CHANGE_KEYMAP",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(recv_name(recv::PING), Some("PING"));
        assert_eq!(send_name(send::PONG), Some("PONG"));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(recv_name(499), None);
        assert_eq!(send_name(499), None);
    }
}
