use poise::serenity_prelude::UserId;
use strum::EnumIter;
use tracing::warn;

use crate::{gate::LocalStore, models::Language};

pub const LANGUAGE_KEY: &str = "language";

#[derive(EnumIter, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    TabAsk,
    TabAbout,
    AboutDescription,
    IntentionSuccess,
    IntentionRequired,
    IntentionPlaceholder,
    IntentionTooLong,
    RequestPray,
    TrackIntention,
    TrackHint,
    Prayer,
    ChangeLanguage,
    LanguageChanged,
    LanguageAutomatic,
    CountdownTitle,
    CooldownActive,
    CooldownElapsed,
    IntentionNotFound,
    Prayers,
    Comments,
    NoComments,
    SentAt,
    PrayerRecorded,
    AlreadyPrayed,
    CommentRecorded,
    Donate,
    DonateDescription,
    NewIntention,
}

/// Every language defines every key.
pub fn text(language: Language, key: MessageKey) -> &'static str {
    match language {
        Language::Pt => pt(key),
        Language::En => en(key),
        Language::Es => es(key),
    }
}

fn pt(key: MessageKey) -> &'static str {
    use MessageKey::*;

    match key {
        TabAsk => "Pedir oração",
        TabAbout => "Sobre",
        AboutDescription => "Intercede4.us é uma iniciativa sem fins lucrativos para ajudar pessoas que sentem necessidade de pedir orações por um problema sério que esteja passando. Pensamentos ruins, de suicídio, problemas nas quais aparentemente não há solução, Deus pode intervir e uma palavra, uma oração, pode salvar uma vida.\n\n## Como funciona?\nO usuário preenche sua intenção (sem necessidade de identificar-se) e envia, será gerado um código único para a oração e todos os intercessores cadastrados na plataforma irão receber esta intenção podendo interceder e enviar mensagens, tudo isso podendo ser acompanhado pelo usuário através do código gerado.\n\n## Como se tornar um Intercessor?\nA princípio somente pessoas previamente cadastradas por nós são os intercessores.",
        IntentionSuccess => "Intenção enviada com sucesso!",
        IntentionRequired => "Por favor, escreva sua intenção.",
        IntentionPlaceholder => "Escreva aqui sua intenção",
        IntentionTooLong => "Sua intenção é longa demais.",
        RequestPray => "Pedir oração",
        TrackIntention => "Rastrear intenção",
        TrackHint => "Guarde este código para acompanhar sua intenção com `/intention track`:",
        Prayer => "Intercessores",
        ChangeLanguage => "Mudar idioma",
        LanguageChanged => "Idioma alterado para",
        LanguageAutomatic => "O idioma voltará a ser detectado automaticamente.",
        CountdownTitle => "Nova Intenção em",
        CooldownActive => "Você acabou de enviar uma intenção.",
        CooldownElapsed => "Você já pode enviar uma nova intenção.",
        IntentionNotFound => "Nenhuma intenção encontrada com este código.",
        Prayers => "Orações",
        Comments => "Mensagens",
        NoComments => "Ainda não há mensagens.",
        SentAt => "Enviada",
        PrayerRecorded => "Obrigado por interceder!",
        AlreadyPrayed => "Você já intercedeu por esta intenção.",
        CommentRecorded => "Mensagem enviada.",
        Donate => "Doar",
        DonateDescription => "Intercede4.us é mantido por doações. Obrigado por ajudar!",
        NewIntention => "Nova intenção",
    }
}

fn en(key: MessageKey) -> &'static str {
    use MessageKey::*;

    match key {
        TabAsk => "Ask for prayer",
        TabAbout => "About",
        AboutDescription => "Intercede4.us is a non-profit initiative to help people who feel the need to ask for prayers for a serious problem they are going through. Dark thoughts, thoughts of suicide, problems that seem to have no solution: God can intervene, and a word, a prayer, can save a life.\n\n## How does it work?\nYou write your intention (no need to identify yourself) and send it. A unique code is generated for it and every intercessor registered on the platform receives the intention, prays for it and may send messages. You can follow all of this with the generated code.\n\n## How to become an intercessor?\nFor now, only people registered by us are intercessors.",
        IntentionSuccess => "Your intention has been sent!",
        IntentionRequired => "Please write your intention.",
        IntentionPlaceholder => "Write your intention here",
        IntentionTooLong => "Your intention is too long.",
        RequestPray => "Ask for prayer",
        TrackIntention => "Track intention",
        TrackHint => "Keep this code to follow your intention with `/intention track`:",
        Prayer => "Intercessors",
        ChangeLanguage => "Change language",
        LanguageChanged => "Language changed to",
        LanguageAutomatic => "The language will be detected automatically again.",
        CountdownTitle => "New intention in",
        CooldownActive => "You have just sent an intention.",
        CooldownElapsed => "You can send a new intention now.",
        IntentionNotFound => "There is no intention with this code.",
        Prayers => "Prayers",
        Comments => "Messages",
        NoComments => "No messages yet.",
        SentAt => "Sent",
        PrayerRecorded => "Thank you for interceding!",
        AlreadyPrayed => "You have already interceded for this intention.",
        CommentRecorded => "Message sent.",
        Donate => "Donate",
        DonateDescription => "Intercede4.us is kept alive by donations. Thank you for helping!",
        NewIntention => "New intention",
    }
}

fn es(key: MessageKey) -> &'static str {
    use MessageKey::*;

    match key {
        TabAsk => "Pedir oración",
        TabAbout => "Acerca de",
        AboutDescription => "Intercede4.us es una iniciativa sin fines de lucro para ayudar a las personas que sienten la necesidad de pedir oraciones por un problema serio que estén pasando. Malos pensamientos, de suicidio, problemas que aparentemente no tienen solución: Dios puede intervenir y una palabra, una oración, puede salvar una vida.\n\n## ¿Cómo funciona?\nEscribes tu intención (sin necesidad de identificarte) y la envías. Se genera un código único y todos los intercesores registrados en la plataforma reciben la intención, pueden interceder y enviar mensajes, y tú puedes seguirlo todo con el código generado.\n\n## ¿Cómo ser intercesor?\nPor ahora, solo las personas registradas por nosotros son intercesores.",
        IntentionSuccess => "¡Tu intención ha sido enviada!",
        IntentionRequired => "Por favor, escribe tu intención.",
        IntentionPlaceholder => "Escribe aquí tu intención",
        IntentionTooLong => "Tu intención es demasiado larga.",
        RequestPray => "Pedir oración",
        TrackIntention => "Seguir intención",
        TrackHint => "Guarda este código para seguir tu intención con `/intention track`:",
        Prayer => "Intercesores",
        ChangeLanguage => "Cambiar idioma",
        LanguageChanged => "Idioma cambiado a",
        LanguageAutomatic => "El idioma se detectará automáticamente de nuevo.",
        CountdownTitle => "Nueva intención en",
        CooldownActive => "Acabas de enviar una intención.",
        CooldownElapsed => "Ya puedes enviar una nueva intención.",
        IntentionNotFound => "No hay ninguna intención con este código.",
        Prayers => "Oraciones",
        Comments => "Mensajes",
        NoComments => "Todavía no hay mensajes.",
        SentAt => "Enviada",
        PrayerRecorded => "¡Gracias por interceder!",
        AlreadyPrayed => "Ya has intercedido por esta intención.",
        CommentRecorded => "Mensaje enviado.",
        Donate => "Donar",
        DonateDescription => "Intercede4.us se mantiene con donaciones. ¡Gracias por ayudar!",
        NewIntention => "Nueva intención",
    }
}

/// The stored language wins; otherwise the language is detected from the
/// interaction locale and remembered.
pub async fn resolve_language<S: LocalStore>(store: &S, locale: Option<&str>) -> Language {
    match store.get(LANGUAGE_KEY).await {
        Ok(Some(code)) => {
            if let Some(language) = Language::from_code(&code) {
                return language;
            }
        }
        Ok(None) => {}
        Err(err) => {
            warn!("Could not read the language, detecting it again: {err}");
        }
    }

    let language = locale.map(Language::detect).unwrap_or(Language::FALLBACK);

    if let Err(err) = store.set(LANGUAGE_KEY, language.code()).await {
        warn!("Could not remember the language: {err}");
    }

    language
}

/// Language of a visitor outside of an interaction.
pub async fn stored_language<S: LocalStore>(store: &S, visitor: UserId) -> Language {
    match store.get(LANGUAGE_KEY).await {
        Ok(code) => code
            .as_deref()
            .and_then(Language::from_code)
            .unwrap_or(Language::FALLBACK),
        Err(err) => {
            warn!("Could not read the language of {visitor}: {err}");
            Language::FALLBACK
        }
    }
}

#[cfg(test)]
mod tests {
    use map_macro::hash_map;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::gate::tests::MemoryStore;

    #[test]
    fn every_language_has_every_message() {
        for language in Language::iter() {
            for key in MessageKey::iter() {
                assert!(
                    !text(language, key).trim().is_empty(),
                    "{language:?} lacks {key:?}"
                );
            }
        }
    }

    #[test_log::test(tokio::test)]
    async fn detects_and_remembers_language() {
        let store = MemoryStore::default();

        assert_eq!(resolve_language(&store, Some("pt-BR")).await, Language::Pt);
        assert_eq!(store.value(LANGUAGE_KEY).as_deref(), Some("pt"));

        assert_eq!(resolve_language(&store, Some("es-ES")).await, Language::Pt);
    }

    #[test_log::test(tokio::test)]
    async fn stored_language_wins() {
        let store = MemoryStore::with(hash_map! {
            LANGUAGE_KEY.to_string() => "es".to_string(),
        });

        assert_eq!(resolve_language(&store, Some("en-US")).await, Language::Es);
    }

    #[test_log::test(tokio::test)]
    async fn unknown_stored_language_is_detected_again() {
        let store = MemoryStore::with(hash_map! {
            LANGUAGE_KEY.to_string() => "klingon".to_string(),
        });

        assert_eq!(resolve_language(&store, None).await, Language::FALLBACK);
        assert_eq!(store.value(LANGUAGE_KEY).as_deref(), Some("en"));
    }

    #[test_log::test(tokio::test)]
    async fn stored_language_defaults_to_fallback() {
        let store = MemoryStore::default();

        assert_eq!(
            stored_language(&store, UserId::new(1)).await,
            Language::FALLBACK
        );
    }
}
