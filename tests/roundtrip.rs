use mqtt_codec::{
    detect,
    packets::{
        conn_ack_packet::{ConnAckCode, ConnAckPacket},
        connect_packet::{ConnectPacket, ProtocolVersion, Will},
        disconnect_packet::DisconnectPacket,
        identified_packet::{
            PubAckPacket, PubCompPacket, PubRecPacket, PubRelPacket, UnsubAckPacket,
        },
        ping_req_packet::PingReqPacket,
        ping_resp_packet::PingRespPacket,
        publish_packet::PublishPacket,
        sub_ack_packet::{SubAckPacket, SubAckReturnCode},
        subscribe_packet::{SubscribePacket, TopicFilter},
        unsubscribe_packet::UnsubscribePacket,
    },
    Error, Packet, PacketType, QoS,
};
use proptest::{collection::vec, option, prelude::*};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn qos_from(value: u8) -> QoS {
    QoS::from_u8(value % 3).unwrap_or_default()
}

/// Encodes `packet`, decodes the result and checks both agree.
fn assert_roundtrip(packet: &Packet<'_>) -> Result<(), TestCaseError> {
    let mut buf = vec![0u8; packet.encoded_len()];
    let written = packet.encode(&mut buf).unwrap();
    prop_assert_eq!(written, buf.len());

    let (decoded, len) = Packet::decode(&buf).unwrap();
    prop_assert_eq!(len, written);
    prop_assert_eq!(&decoded, packet);

    prop_assert_eq!(detect(&buf).unwrap(), Some((written, packet.kind())));

    Ok(())
}

fn topic_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9/+#]{0,24}"
}

fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..300)
}

proptest! {
    #[test]
    fn identified_packets_roundtrip(kind in 0u8..5, packet_id in 1u16..) {
        init();

        let packet = match kind {
            0 => Packet::PubAck(PubAckPacket::new(packet_id)),
            1 => Packet::PubRec(PubRecPacket::new(packet_id)),
            2 => Packet::PubRel(PubRelPacket::new(packet_id)),
            3 => Packet::PubComp(PubCompPacket::new(packet_id)),
            _ => Packet::UnsubAck(UnsubAckPacket::new(packet_id)),
        };

        prop_assert_eq!(packet.encoded_len(), 4);
        assert_roundtrip(&packet)?;
    }

    #[test]
    fn connack_roundtrip(session_present: bool, code: u8) {
        let packet = Packet::ConnAck(ConnAckPacket {
            session_present,
            return_code: ConnAckCode::from_u8(code),
        });

        assert_roundtrip(&packet)?;
    }

    #[test]
    fn publish_roundtrip(
        dup: bool,
        raw_qos: u8,
        retain: bool,
        topic in topic_strategy(),
        packet_id in 1u16..,
        payload in payload_strategy(),
    ) {
        let qos = qos_from(raw_qos);
        let packet = Packet::Publish(PublishPacket {
            dup,
            qos,
            retain,
            topic: &topic,
            packet_id: if qos == QoS::AtMostOnce { 0 } else { packet_id },
            payload: &payload,
        });

        assert_roundtrip(&packet)?;
    }

    #[test]
    fn connect_roundtrip(
        v31: bool,
        clean_session: bool,
        keep_alive: u16,
        client_id in "[a-zA-Z0-9]{0,23}",
        will in option::of((topic_strategy(), payload_strategy(), any::<u8>(), any::<bool>())),
        username in option::of("[a-z]{1,12}"),
        password in option::of(vec(any::<u8>(), 0..32)),
    ) {
        let protocol_version = if v31 { ProtocolVersion::V31 } else { ProtocolVersion::V311 };
        let will = will.as_ref().map(|(topic, payload, raw_qos, retain)| Will {
            topic,
            payload,
            qos: qos_from(*raw_qos),
            retain: *retain,
        });

        // A password is only allowed together with a username
        let password = if username.is_some() { password.as_deref() } else { None };

        let packet = Packet::Connect(ConnectPacket {
            protocol_version,
            clean_session,
            keep_alive,
            client_id: &client_id,
            will,
            username: username.as_deref(),
            password,
        });

        assert_roundtrip(&packet)?;
    }

    #[test]
    fn subscribe_roundtrip(
        packet_id in 1u16..,
        filters in vec((topic_strategy(), any::<u8>()), 1..8),
    ) {
        let packet = Packet::Subscribe(SubscribePacket {
            packet_id,
            filters: filters
                .iter()
                .map(|(topic, raw_qos)| TopicFilter { topic, qos: qos_from(*raw_qos) })
                .collect(),
        });

        assert_roundtrip(&packet)?;
    }

    #[test]
    fn suback_roundtrip(packet_id in 1u16.., codes in vec(0u8..4, 0..16)) {
        let return_codes = codes
            .iter()
            .map(|&code| match code {
                3 => SubAckReturnCode::Failure,
                code => SubAckReturnCode::Success(qos_from(code)),
            })
            .collect();

        assert_roundtrip(&Packet::SubAck(SubAckPacket { packet_id, return_codes }))?;
    }

    #[test]
    fn unsubscribe_roundtrip(packet_id in 1u16.., topics in vec(topic_strategy(), 1..8)) {
        let packet = Packet::Unsubscribe(UnsubscribePacket {
            packet_id,
            topics: topics.iter().map(String::as_str).collect(),
        });

        assert_roundtrip(&packet)?;
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in vec(any::<u8>(), 0..64)) {
        check_arbitrary_input(&bytes)?;
    }

    #[test]
    fn arbitrary_bodies_never_panic(first_byte: u8, body in vec(any::<u8>(), 0..64)) {
        let mut bytes = vec![first_byte, body.len() as u8];
        bytes.extend_from_slice(&body);

        check_arbitrary_input(&bytes)?;
    }
}

/// Runs detect and decode on untrusted input. A successful decode must survive
/// another encode and decode unchanged.
fn check_arbitrary_input(bytes: &[u8]) -> Result<(), TestCaseError> {
    let Ok(Some((len, _))) = detect(bytes) else {
        return Ok(());
    };

    let Ok((packet, used)) = Packet::decode(bytes) else {
        return Ok(());
    };

    prop_assert_eq!(used, len);

    let reencoded = packet.to_bytes().unwrap();
    prop_assert_eq!(reencoded.len(), packet.encoded_len());

    let (again, _) = Packet::decode(&reencoded).unwrap();
    prop_assert_eq!(again, packet);

    Ok(())
}

#[test]
fn header_only_packets_roundtrip() {
    init();

    for packet in [
        Packet::PingReq(PingReqPacket),
        Packet::PingResp(PingRespPacket),
        Packet::Disconnect(DisconnectPacket),
    ] {
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(bytes.len(), 2);
        assert_eq!(Packet::decode(&bytes).unwrap(), (packet, 2));
    }
}

#[test]
fn detect_needs_more_bytes() {
    assert_eq!(detect(&[0x62]), Ok(None));
}

#[test]
fn pubrel_from_the_wire() {
    let bytes = [0x62, 0x02, 0x00, 0x07];

    assert_eq!(detect(&bytes), Ok(Some((4, PacketType::PubRel))));
    assert_eq!(Packet::decode(&bytes), Ok((Packet::PubRel(PubRelPacket::new(7)), 4)));
}

#[test]
fn zero_packet_id_is_never_encoded() {
    let mut buf = [0u8; 4];

    for packet in [
        Packet::PubAck(PubAckPacket::new(0)),
        Packet::PubRec(PubRecPacket::new(0)),
        Packet::PubRel(PubRelPacket::new(0)),
        Packet::PubComp(PubCompPacket::new(0)),
        Packet::UnsubAck(UnsubAckPacket::new(0)),
    ] {
        assert_eq!(packet.encode(&mut buf), Err(Error::ZeroPacketId));
    }
}

#[test]
fn reserved_types_cannot_be_created() {
    assert_eq!(Packet::new(PacketType::Reserved), Err(Error::InvalidMessageType(0)));
    assert_eq!(Packet::new(PacketType::Reserved2), Err(Error::InvalidMessageType(15)));
}

#[test]
fn stream_of_packets_is_split_by_detect() {
    init();

    let publish = PublishPacket {
        qos: QoS::AtLeastOnce,
        topic: "sensors/1",
        packet_id: 3,
        payload: b"21.5",
        ..Default::default()
    };
    let packets = [
        Packet::Publish(publish),
        Packet::PubAck(PubAckPacket::new(3)),
        Packet::PingReq(PingReqPacket),
    ];

    let mut stream = Vec::new();
    for packet in &packets {
        stream.extend_from_slice(&packet.to_bytes().unwrap());
    }

    let mut offset = 0;
    let mut decoded = Vec::new();
    while let Some((len, _)) = detect(&stream[offset..]).unwrap() {
        let (packet, used) = Packet::decode(&stream[offset..]).unwrap();
        assert_eq!(used, len);
        decoded.push(packet);
        offset += len;
    }

    assert_eq!(offset, stream.len());
    assert_eq!(decoded, packets);
}
