//! Canned sales assistant.
//!
//! There is no model behind this: a prompt is classified by keyword and
//! answered with one of a few prepared texts. Both steps are pure, so the
//! same prompt always yields the same answer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Pricing,
    Discount,
    SalesStrategy,
    Client,
    Analytics,
    Product,
    Quote,
    Legal,
    Support,
    General,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Pricing => "pricing",
            Intent::Discount => "discount",
            Intent::SalesStrategy => "sales-strategy",
            Intent::Client => "client",
            Intent::Analytics => "analytics",
            Intent::Product => "product",
            Intent::Quote => "quote",
            Intent::Legal => "legal",
            Intent::Support => "support",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checked in order; the first intent with a matching keyword wins.
const KEYWORDS: [(Intent, [&str; 3]); 9] = [
    (Intent::Pricing, ["prezzo", "costo", "tariff"]),
    (Intent::Discount, ["sconto", "discount", "promozione"]),
    (Intent::SalesStrategy, ["strategia", "vendita", "marketing"]),
    (Intent::Client, ["cliente", "customer", "segmentazione"]),
    (Intent::Analytics, ["analisi", "report", "trend"]),
    (Intent::Product, ["prodotto", "servizio", "catalogo"]),
    (Intent::Quote, ["offerta", "preventivo", "proposta"]),
    (Intent::Legal, ["fattura", "tasse", "iva"]),
    (Intent::Support, ["problema", "errore", "aiuto"]),
];

pub fn classify(prompt: &str) -> Intent {
    let lower = prompt.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

pub fn respond(intent: Intent, prompt: &str) -> &'static str {
    let choices = templates(intent);
    choices[pick(prompt, choices.len())]
}

/// Classify and respond in one step.
pub fn ask(prompt: &str) -> (Intent, &'static str) {
    let intent = classify(prompt);
    (intent, respond(intent, prompt))
}

fn pick(prompt: &str, len: usize) -> usize {
    let sum = prompt
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    sum % len.max(1)
}

fn templates(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Pricing => &PRICING,
        Intent::Discount => &DISCOUNT,
        Intent::SalesStrategy => &SALES_STRATEGY,
        Intent::Client => &CLIENT,
        Intent::Analytics => &ANALYTICS,
        Intent::Product => &PRODUCT,
        Intent::Quote => &QUOTE,
        Intent::Legal => &LEGAL,
        Intent::Support => &SUPPORT,
        Intent::General => &GENERAL,
    }
}

const PRICING: [&str; 3] = [
    "Per determinare prezzi competitivi, considera questi fattori:\n\n\
     • Costi diretti: materiali, manodopera, spese operative\n\
     • Margine target: generalmente 20-40% per prodotti, 50-70% per servizi\n\
     • Analisi competitor: posizionamento nel mercato\n\
     • Valore percepito: benefici unici che offri\n\n\
     Suggerimento: prezzi basati sul valore per il cliente, non solo sui costi.",
    "Strategie di pricing efficaci:\n\n\
     • Prezzo psicologico: €99 invece di €100\n\
     • Bundle pricing: pacchetti con sconto\n\
     • Prezzo dinamico: variazioni stagionali\n\
     • Freemium: base gratuita + premium\n\n\
     Testa sempre 2-3 livelli di prezzo per trovare l'ottimale.",
    "Per calcolare il prezzo ottimale:\n\n\
     1. Costo totale × 1.3-1.7 (margine)\n\
     2. Benchmark competitor ± 10-15%\n\
     3. Test con clienti pilota\n\
     4. Aggiustamenti in base ai feedback\n\n\
     Il prezzo giusto massimizza profitto × volume vendite.",
];

const DISCOUNT: [&str; 2] = [
    "Strategie di sconto:\n\n\
     • Sconto volume: 5-10% per ordini grandi\n\
     • Sconto fedeltà: 3-7% per clienti ricorrenti\n\
     • Pagamento anticipato: 2-5% per pagamento immediato\n\
     • Sconto stagionale: 10-20% in periodi specifici\n\n\
     Evita sconti superiori al 30%: danneggiano la percezione del valore.",
    "Tipi di sconto per aumentare le vendite:\n\n\
     • Sconto progressivo: aumenta con la quantità\n\
     • Sconto a tempo: urgenza e scarsità\n\
     • Sconto combo: prodotti correlati insieme\n\
     • Sconto primo acquisto: acquisizione nuovi clienti\n\n\
     Obiettivo: aumentare il valore medio dell'ordine, non solo il volume.",
];

const SALES_STRATEGY: [&str; 2] = [
    "Strategia di vendita:\n\n\
     1. Ascolta attivamente il cliente\n\
     2. Identifica il problema reale\n\
     3. Presenta la soluzione su misura\n\
     4. Dimostra il valore con esempi concreti\n\
     5. Gestisci le obiezioni con empatia\n\
     6. Chiudi con sicurezza",
    "Tecniche di vendita:\n\n\
     • SPIN Selling: Situation, Problem, Implication, Need\n\
     • Consultative selling: consulente, non venditore\n\
     • Social selling: networking\n\
     • Storytelling: casi di successo concreti\n\n\
     Molte vendite arrivano dopo il quinto contatto.",
];

const CLIENT: [&str; 2] = [
    "Segmentazione clienti:\n\n\
     • VIP: >€50k annui, servizio premium\n\
     • Standard: €10-50k, servizio regolare\n\
     • Nuovo: <€10k, focus acquisizione\n\n\
     VIP: account manager dedicato. Standard: check-in mensili. Nuovo: onboarding guidato.",
    "Gestione relazioni clienti:\n\n\
     • Ogni interazione tracciata\n\
     • Follow-up sistematico: 1-3-7-30 giorni\n\
     • Feedback attivo: sondaggi e chiamate\n\
     • Valore aggiunto: contenuti utili, consigli\n\n\
     Obiettivo: valore nel tempo, non singola vendita.",
];

const ANALYTICS: [&str; 2] = [
    "Metriche commerciali chiave:\n\n\
     • Conversion rate: offerte/vendite chiuse\n\
     • Average deal size: valore medio offerta\n\
     • Sales cycle: tempo medio di chiusura\n\
     • Customer acquisition cost\n\
     • Lifetime value",
    "Come leggere i trend:\n\n\
     • Trend stagionali: picchi e cali prevedibili\n\
     • Crescita mese su mese\n\
     • Performance prodotti: best e worst seller\n\
     • Efficacia dei canali di vendita",
];

const PRODUCT: [&str; 2] = [
    "Ottimizzazione del catalogo:\n\n\
     • Analisi ABC: 20% dei prodotti = 80% del fatturato\n\
     • Cross-selling: prodotti complementari\n\
     • Up-selling: versioni premium\n\
     • Ciclo di vita: introduzione, crescita, declino\n\n\
     Concentrati sui prodotti ad alto margine e rotazione.",
    "Descrizioni prodotto efficaci:\n\n\
     • Benefici invece di caratteristiche\n\
     • Linguaggio del cliente, non tecnico\n\
     • Recensioni e casi reali\n\
     • Call-to-action chiara",
];

const QUOTE: [&str; 2] = [
    "Un'offerta completa contiene:\n\n\
     1. Intestazione professionale\n\
     2. Analisi delle esigenze del cliente\n\
     3. Soluzione proposta nel dettaglio\n\
     4. Investimento\n\
     5. Termini e condizioni chiari\n\
     6. Garanzie e supporto post-vendita\n\
     7. Call-to-action con scadenza",
    "Elementi che aumentano il tasso di chiusura:\n\n\
     • Personalizzazione: nome e logo del cliente\n\
     • Validità limitata\n\
     • Opzioni multiple: basic, standard, premium\n\
     • Casi di successo simili\n\
     • FAQ che anticipano i dubbi",
];

const LEGAL: [&str; 1] = [
    "Per questioni legali e fiscali consulta un commercialista o un consulente legale. \
     Posso aiutarti con modelli di condizioni generali, promemoria delle scadenze \
     e organizzazione dei documenti.",
];

const SUPPORT: [&str; 1] = [
    "Posso assisterti con:\n\n\
     • Creazione offerte\n\
     • Gestione clienti e segmentazione\n\
     • Strategie di prezzo\n\
     • Analisi dati e trend\n\n\
     Descrivi il problema e ti indicherò i passi da seguire.",
];

const GENERAL: [&str; 1] = [
    "Ciao! Posso aiutarti con:\n\n\
     • Strategie di vendita e pricing\n\
     • Gestione clienti e segmentazione\n\
     • Analisi delle performance\n\
     • Contenuti per le offerte",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_first_matching_group() {
        assert_eq!(classify("Che PREZZO mettere?"), Intent::Pricing);
        assert_eq!(classify("uno sconto per il cliente"), Intent::Discount);
        assert_eq!(classify("report mensile"), Intent::Analytics);
        assert_eq!(classify("devo emettere fattura"), Intent::Legal);
        assert_eq!(classify("buongiorno"), Intent::General);
    }

    #[test]
    fn earlier_groups_take_precedence() {
        // "costo" (pricing) beats "offerta" (quote)
        assert_eq!(classify("costo dell'offerta"), Intent::Pricing);
    }

    #[test]
    fn responses_are_deterministic() {
        let (intent, first) = ask("tariffe 2025");
        let (_, second) = ask("tariffe 2025");
        assert_eq!(intent, Intent::Pricing);
        assert_eq!(first, second);
        assert!(PRICING.contains(&first));
    }

    #[test]
    fn every_intent_has_a_template() {
        for (intent, _) in KEYWORDS {
            assert!(!respond(intent, "x").is_empty());
        }
        assert!(!respond(Intent::General, "").is_empty());
    }
}
