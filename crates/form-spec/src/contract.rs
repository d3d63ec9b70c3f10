//! Static per-kind contract: which optional fields a kind owns, whether it is
//! a structural step, which editor affordance it gets and what single-line
//! answer shape a submission validator should expect.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::spec::question::QuestionKind;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[\d\s().-]{8,20}$";
const DATE_PATTERN: &str = r"^(0?[1-9]|[12]\d|3[01])\s*/\s*(0?[1-9]|1[0-2])\s*/\s*\d{4}$";
const URL_PATTERN: &str = r"^(https?://)?[\w-]+(\.[\w-]+)+(/\S*)?$";
const CPF_PATTERN: &str = r"^\d{3}\.?\d{3}\.?\d{3}-?\d{2}$";
const CNPJ_PATTERN: &str = r"^\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}$";
const IDENTITY_DOCUMENT_PATTERN: &str = r"^[\w./-]{4,20}$";
const NUMBER_PATTERN: &str = r"^-?\d+([.,]\d+)?$";
const CURRENCY_PATTERN: &str = r"^(R\$\s?)?-?(\d+|\d{1,3}(\.\d{3})+)([.,]\d{1,2})?$";
const SCALE_PATTERN: &str = r"^\d{1,2}$";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("answer pattern compiles")
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| compile(EMAIL_PATTERN));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| compile(PHONE_PATTERN));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| compile(DATE_PATTERN));
static URL_RE: LazyLock<Regex> = LazyLock::new(|| compile(URL_PATTERN));
static CPF_RE: LazyLock<Regex> = LazyLock::new(|| compile(CPF_PATTERN));
static CNPJ_RE: LazyLock<Regex> = LazyLock::new(|| compile(CNPJ_PATTERN));
static IDENTITY_DOCUMENT_RE: LazyLock<Regex> = LazyLock::new(|| compile(IDENTITY_DOCUMENT_PATTERN));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile(NUMBER_PATTERN));
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| compile(CURRENCY_PATTERN));
static SCALE_RE: LazyLock<Regex> = LazyLock::new(|| compile(SCALE_PATTERN));

/// Optional question fields owned by a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OwnedFields {
    pub options: bool,
    pub list_options: bool,
    pub attached_file: bool,
}

impl OwnedFields {
    const NONE: OwnedFields = OwnedFields {
        options: false,
        list_options: false,
        attached_file: false,
    };
}

/// Expected answer shape for real submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum AnswerFormat {
    FreeText,
    MultiLineText,
    PersonName,
    Email,
    Phone,
    /// Day / month / year.
    Date,
    Url,
    IdentityDocument,
    Cpf,
    Cnpj,
    Number,
    /// Decimal amount, optionally prefixed with `R$`.
    Currency,
    Address,
    Choice,
    Scale { min: u8, max: u8 },
    File,
    Acceptance,
    Booking,
    /// Structural steps take no answer.
    NoAnswer,
}

impl AnswerFormat {
    /// Regular expression a conforming answer must match, if the format has one.
    pub fn pattern(&self) -> Option<&'static str> {
        self.regex().map(Regex::as_str)
    }

    /// Compiled form of [`AnswerFormat::pattern`], built once per format.
    pub fn regex(&self) -> Option<&'static Regex> {
        let regex: &'static LazyLock<Regex> = match self {
            AnswerFormat::Email => &EMAIL_RE,
            AnswerFormat::Phone => &PHONE_RE,
            AnswerFormat::Date => &DATE_RE,
            AnswerFormat::Url => &URL_RE,
            AnswerFormat::Cpf => &CPF_RE,
            AnswerFormat::Cnpj => &CNPJ_RE,
            AnswerFormat::IdentityDocument => &IDENTITY_DOCUMENT_RE,
            AnswerFormat::Number => &NUMBER_RE,
            AnswerFormat::Currency => &CURRENCY_RE,
            AnswerFormat::Scale { .. } => &SCALE_RE,
            _ => return None,
        };
        Some(LazyLock::force(regex))
    }

    /// Whether `value` conforms to this format. Exposed for submission-time
    /// validators; the editing engine never calls it on its own.
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        if matches!(self, AnswerFormat::NoAnswer) {
            return value.is_empty();
        }
        if value.is_empty() {
            return false;
        }
        if let Some(regex) = self.regex()
            && !regex.is_match(value)
        {
            return false;
        }
        if let AnswerFormat::Scale { min, max } = self {
            return value
                .parse::<u8>()
                .is_ok_and(|score| (*min..=*max).contains(&score));
        }
        true
    }
}

/// Input surface the editor and preview show for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Affordance {
    TextInput { placeholder: &'static str },
    TextArea { placeholder: &'static str },
    PhoneInput { placeholder: &'static str },
    AddressInput { placeholder: &'static str },
    SchedulerUrl { placeholder: &'static str },
    OptionsEditor,
    ListItemsEditor,
    ScaleSelector { min: u8, max: u8 },
    ImageChoiceGrid,
    FileSlot,
    TermsAcceptance,
    ContinueButton { label: &'static str },
    StartButton { label: &'static str },
    ClosingMessage,
}

/// Everything the engine knows about one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindContract {
    pub kind: QuestionKind,
    pub label: &'static str,
    pub structural: bool,
    pub owned: OwnedFields,
    pub answer: AnswerFormat,
    pub affordance: Affordance,
}

impl KindContract {
    /// Whether the editing surface shows the step-index badge.
    pub fn shows_step_badge(&self) -> bool {
        !self.structural
    }

    /// Whether the editing surface shows the description field.
    pub fn shows_description(&self) -> bool {
        !self.structural
    }

    /// Whether the editing surface shows the "required" toggle.
    pub fn shows_required_toggle(&self) -> bool {
        !self.structural
    }

    /// Whether per-answer counts would be charted rather than listed.
    pub fn is_choice_like(&self) -> bool {
        matches!(self.answer, AnswerFormat::Choice | AnswerFormat::Scale { .. })
    }
}

const ANSWER_PLACEHOLDER: &str = "Sua resposta...";

const fn input(
    kind: QuestionKind,
    label: &'static str,
    answer: AnswerFormat,
    placeholder: &'static str,
) -> KindContract {
    KindContract {
        kind,
        label,
        structural: false,
        owned: OwnedFields::NONE,
        answer,
        affordance: Affordance::TextInput { placeholder },
    }
}

const SHORT_TEXT: KindContract = input(
    QuestionKind::ShortText,
    "Resposta curta",
    AnswerFormat::FreeText,
    ANSWER_PLACEHOLDER,
);
const PROPER_NAME: KindContract = input(
    QuestionKind::ProperName,
    "Nome próprio",
    AnswerFormat::PersonName,
    ANSWER_PLACEHOLDER,
);
const LONG_TEXT: KindContract = KindContract {
    affordance: Affordance::TextArea {
        placeholder: ANSWER_PLACEHOLDER,
    },
    ..input(
        QuestionKind::LongText,
        "Texto longo",
        AnswerFormat::MultiLineText,
        ANSWER_PLACEHOLDER,
    )
};
const EMAIL: KindContract = input(
    QuestionKind::Email,
    "E-mail",
    AnswerFormat::Email,
    "exemplo@exemplo.com",
);
const PHONE: KindContract = KindContract {
    affordance: Affordance::PhoneInput {
        placeholder: "( 00 ) 00000-0000",
    },
    ..input(QuestionKind::Phone, "Telefone", AnswerFormat::Phone, "")
};
const DATE: KindContract = input(
    QuestionKind::Date,
    "Data",
    AnswerFormat::Date,
    "DD / MM / AAAA",
);
const SCHEDULER: KindContract = KindContract {
    affordance: Affordance::SchedulerUrl {
        placeholder: "https://calendly.com/xxxx",
    },
    ..input(QuestionKind::Scheduler, "Calendly", AnswerFormat::Booking, "")
};
const LINK: KindContract = input(
    QuestionKind::Link,
    "Link",
    AnswerFormat::Url,
    "https://exemplo.com",
);
const IDENTITY_DOCUMENT: KindContract = input(
    QuestionKind::IdentityDocument,
    "Documento de identidade",
    AnswerFormat::IdentityDocument,
    "...",
);
const CPF: KindContract = input(QuestionKind::Cpf, "CPF", AnswerFormat::Cpf, "...");
const CNPJ: KindContract = input(QuestionKind::Cnpj, "CNPJ", AnswerFormat::Cnpj, "...");
const NUMBER: KindContract = input(QuestionKind::Number, "Número", AnswerFormat::Number, "...");
const CURRENCY: KindContract = input(
    QuestionKind::Currency,
    "Valor monetário",
    AnswerFormat::Currency,
    "R$ 0,00",
);
const ADDRESS: KindContract = KindContract {
    affordance: Affordance::AddressInput { placeholder: "CEP" },
    ..input(QuestionKind::Address, "Endereço", AnswerFormat::Address, "")
};
const MULTIPLE_CHOICE: KindContract = KindContract {
    owned: OwnedFields {
        options: true,
        list_options: false,
        attached_file: false,
    },
    affordance: Affordance::OptionsEditor,
    ..input(
        QuestionKind::MultipleChoice,
        "Múltipla escolha",
        AnswerFormat::Choice,
        "",
    )
};
const SATISFACTION_SCALE: KindContract = KindContract {
    affordance: Affordance::ScaleSelector { min: 1, max: 10 },
    ..input(
        QuestionKind::SatisfactionScale,
        "Escala de satisfação",
        AnswerFormat::Scale { min: 1, max: 10 },
        "",
    )
};
const IMAGE_CHOICE: KindContract = KindContract {
    affordance: Affordance::ImageChoiceGrid,
    ..input(
        QuestionKind::ImageChoice,
        "Seleção de imagem",
        AnswerFormat::Choice,
        "",
    )
};
const LIST_SELECT: KindContract = KindContract {
    owned: OwnedFields {
        options: false,
        list_options: true,
        attached_file: false,
    },
    affordance: Affordance::ListItemsEditor,
    ..input(
        QuestionKind::ListSelect,
        "Seleção de lista",
        AnswerFormat::Choice,
        "",
    )
};
const FILE_ATTACHMENT: KindContract = KindContract {
    owned: OwnedFields {
        options: false,
        list_options: false,
        attached_file: true,
    },
    affordance: Affordance::FileSlot,
    ..input(
        QuestionKind::FileAttachment,
        "Arquivo anexo",
        AnswerFormat::File,
        "",
    )
};
const TERMS_ACCEPTANCE: KindContract = KindContract {
    affordance: Affordance::TermsAcceptance,
    ..input(
        QuestionKind::TermsAcceptance,
        "Termos de uso",
        AnswerFormat::Acceptance,
        "",
    )
};
const MESSAGE: KindContract = KindContract {
    kind: QuestionKind::Message,
    label: "Mensagem",
    structural: true,
    owned: OwnedFields::NONE,
    answer: AnswerFormat::NoAnswer,
    affordance: Affordance::ContinueButton {
        label: "Continuar →",
    },
};
const WELCOME: KindContract = KindContract {
    kind: QuestionKind::Welcome,
    label: "Boas-vindas",
    affordance: Affordance::StartButton { label: "Começar →" },
    ..MESSAGE
};
const THANK_YOU: KindContract = KindContract {
    kind: QuestionKind::ThankYou,
    label: "Agradecimento",
    affordance: Affordance::ClosingMessage,
    ..MESSAGE
};

/// Looks up the contract for `kind`.
pub fn contract(kind: QuestionKind) -> &'static KindContract {
    match kind {
        QuestionKind::ShortText => &SHORT_TEXT,
        QuestionKind::ProperName => &PROPER_NAME,
        QuestionKind::LongText => &LONG_TEXT,
        QuestionKind::Email => &EMAIL,
        QuestionKind::Phone => &PHONE,
        QuestionKind::Date => &DATE,
        QuestionKind::Scheduler => &SCHEDULER,
        QuestionKind::Link => &LINK,
        QuestionKind::IdentityDocument => &IDENTITY_DOCUMENT,
        QuestionKind::Cpf => &CPF,
        QuestionKind::Cnpj => &CNPJ,
        QuestionKind::Number => &NUMBER,
        QuestionKind::Currency => &CURRENCY,
        QuestionKind::Address => &ADDRESS,
        QuestionKind::MultipleChoice => &MULTIPLE_CHOICE,
        QuestionKind::SatisfactionScale => &SATISFACTION_SCALE,
        QuestionKind::ImageChoice => &IMAGE_CHOICE,
        QuestionKind::ListSelect => &LIST_SELECT,
        QuestionKind::FileAttachment => &FILE_ATTACHMENT,
        QuestionKind::Message => &MESSAGE,
        QuestionKind::TermsAcceptance => &TERMS_ACCEPTANCE,
        QuestionKind::Welcome => &WELCOME,
        QuestionKind::ThankYou => &THANK_YOU,
    }
}
